//! JSON mapping helpers.
//!
//! Responses use camelCase keys; list endpoints share the envelope built by
//! [`list_envelope`].

use serde_json::{json, Value};

use depot_auth::User;
use depot_catalog::{Category, Stock};
use depot_core::PageParams;
use depot_orders::{Invoice, Order};
use depot_store::repo::{PopulatedInvoice, PopulatedOrder, PopulatedStock};

pub fn list_envelope(total: i64, page: &PageParams, data: Vec<Value>) -> Value {
    json!({
        "total": total,
        "page": page.page,
        "perpage": page.perpage,
        "data": data,
    })
}

pub fn stock_to_json(stock: &Stock) -> Value {
    json!({
        "id": stock.id.to_string(),
        "code": stock.code,
        "name": stock.name,
        "description": stock.description,
        "price": stock.price,
        "discountPercentage": stock.discount_percentage,
        "inStock": stock.in_stock,
        "reorderLevel": stock.reorder_level,
        "categoryId": stock.category_id.map(|id| id.to_string()),
        "images": stock.images,
        "status": stock.status,
        "rating": stock.rating,
        "createdBy": stock.created_by,
        "updatedBy": stock.updated_by,
        "time": stock.time,
    })
}

pub fn populated_stock_to_json(populated: &PopulatedStock) -> Value {
    let mut value = stock_to_json(&populated.stock);
    value["category"] = match &populated.category {
        Some(c) => json!({ "id": c.id.to_string(), "name": c.name }),
        None => Value::Null,
    };
    value
}

pub fn category_to_json(category: &Category) -> Value {
    json!({
        "id": category.id.to_string(),
        "name": category.name,
        "time": category.time,
    })
}

/// Never includes the password hash.
pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "name": user.name,
        "email": user.email,
        "time": user.time,
    })
}

pub fn order_to_json(order: &Order) -> Value {
    json!({
        "id": order.id.to_string(),
        "orderNumber": order.order_number,
        "userId": order.user_id.map(|id| id.to_string()),
        "lines": order
            .lines
            .iter()
            .map(|l| json!({
                "stockId": l.stock_id.to_string(),
                "quantity": l.quantity,
                "unitPrice": l.unit_price,
            }))
            .collect::<Vec<_>>(),
        "total": order.total,
        "status": order.status,
        "createdBy": order.created_by,
        "updatedBy": order.updated_by,
        "time": order.time,
    })
}

pub fn populated_order_to_json(populated: &PopulatedOrder) -> Value {
    let mut value = order_to_json(&populated.order);
    value["user"] = match &populated.user {
        Some(u) => json!({ "id": u.id.to_string(), "name": u.name }),
        None => Value::Null,
    };
    value
}

pub fn invoice_to_json(invoice: &Invoice) -> Value {
    json!({
        "id": invoice.id.to_string(),
        "invoiceNumber": invoice.invoice_number,
        "orderId": invoice.order_id.map(|id| id.to_string()),
        "amount": invoice.amount,
        "status": invoice.status,
        "createdBy": invoice.created_by,
        "updatedBy": invoice.updated_by,
        "issuedAt": invoice.issued_at,
        "time": invoice.time,
    })
}

pub fn populated_invoice_to_json(populated: &PopulatedInvoice) -> Value {
    let mut value = invoice_to_json(&populated.invoice);
    value["order"] = match &populated.order {
        Some(o) => json!({ "id": o.id.to_string(), "orderNumber": o.order_number }),
        None => Value::Null,
    };
    value
}

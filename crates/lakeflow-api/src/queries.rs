//! Predefined query catalog.
//!
//! Named, read-only SQL shipped with the service. Two placeholders are
//! supported: `{limit}` for top-N queries and `{threshold}` for the low
//! stock report. Parameters are clamped server-side, never interpolated
//! from free-form text.

/// Query parameters accepted by catalog entries.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct QueryParams {
    pub limit: Option<u32>,
    pub threshold: Option<u32>,
}

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_THRESHOLD: u32 = 100;

/// One catalog entry: opaque SQL plus a short description.
pub struct PredefinedQuery {
    pub name: &'static str,
    pub description: &'static str,
    sql: &'static str,
}

impl PredefinedQuery {
    /// Render the SQL with clamped parameters substituted.
    pub fn render(&self, params: QueryParams) -> String {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let threshold = params.threshold.unwrap_or(DEFAULT_THRESHOLD).max(1);
        self.sql
            .replace("{limit}", &limit.to_string())
            .replace("{threshold}", &threshold.to_string())
    }
}

/// Find a catalog entry by name.
pub fn lookup(name: &str) -> Option<&'static PredefinedQuery> {
    CATALOG.iter().find(|q| q.name == name)
}

/// All catalog entry names, in catalog order.
pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|q| q.name).collect()
}

pub static CATALOG: &[PredefinedQuery] = &[
    PredefinedQuery {
        name: "sales_summary",
        description: "Order count plus total, average, min, and max amounts",
        sql: "\
SELECT
    COUNT(*) AS total_orders,
    SUM(total_amount) AS total_sales,
    AVG(total_amount) AS average_ticket,
    MIN(total_amount) AS smallest_order,
    MAX(total_amount) AS largest_order
FROM orders",
    },
    PredefinedQuery {
        name: "sales_by_user",
        description: "Per-user order count and spend, highest spenders first",
        sql: "\
SELECT
    u.username,
    u.email,
    COUNT(o.id) AS total_orders,
    COALESCE(SUM(o.total_amount), 0) AS total_spent,
    COALESCE(AVG(o.total_amount), 0) AS average_order
FROM users u
LEFT JOIN orders o ON u.id = o.user_id
GROUP BY u.username, u.email
ORDER BY total_spent DESC",
    },
    PredefinedQuery {
        name: "orders_by_status",
        description: "Order counts and amounts grouped by status",
        sql: "\
SELECT
    status,
    COUNT(*) AS order_count,
    SUM(total_amount) AS total_amount,
    AVG(total_amount) AS average_amount
FROM orders
GROUP BY status
ORDER BY total_amount DESC",
    },
    PredefinedQuery {
        name: "top_products",
        description: "Most valuable in-stock products by inventory value",
        sql: "\
SELECT
    name,
    category,
    price,
    stock,
    price * stock AS inventory_value
FROM products
WHERE stock > 0
ORDER BY inventory_value DESC
LIMIT {limit}",
    },
    PredefinedQuery {
        name: "top_customers",
        description: "Customers ranked by total invoiced amount",
        sql: "\
SELECT
    c.name AS customer,
    c.country,
    c.email,
    COUNT(i.id) AS total_invoices,
    COALESCE(SUM(i.total), 0) AS total_billed
FROM customers c
LEFT JOIN invoices i ON c.id = i.customer_id
GROUP BY c.name, c.country, c.email
ORDER BY total_billed DESC
LIMIT {limit}",
    },
    PredefinedQuery {
        name: "invoice_status",
        description: "Invoice totals against received payments",
        sql: "\
SELECT
    i.invoice_number,
    c.name AS customer,
    i.total AS invoice_amount,
    COALESCE(SUM(p.amount), 0) AS amount_paid,
    i.total - COALESCE(SUM(p.amount), 0) AS outstanding_balance,
    i.status AS invoice_status
FROM invoices i
JOIN customers c ON i.customer_id = c.id
LEFT JOIN payments p ON i.id = p.invoice_id
GROUP BY i.invoice_number, c.name, i.total, i.status
ORDER BY outstanding_balance DESC",
    },
    PredefinedQuery {
        name: "low_stock",
        description: "Inventory items below the stock threshold",
        sql: "\
SELECT
    product_id,
    name,
    quantity,
    warehouse_location,
    supplier
FROM inventory
WHERE CAST(quantity AS INTEGER) < {threshold}
ORDER BY CAST(quantity AS INTEGER) ASC",
    },
    PredefinedQuery {
        name: "shipment_status",
        description: "Shipment counts grouped by status and carrier",
        sql: "\
SELECT
    status,
    carrier,
    COUNT(*) AS total_shipments
FROM shipments
GROUP BY status, carrier
ORDER BY total_shipments DESC",
    },
    PredefinedQuery {
        name: "executive_dashboard",
        description: "One-row-per-metric rollup across all sources",
        sql: "\
SELECT 'Total Users' AS metric, CAST(COUNT(*) AS VARCHAR) AS value, 'users' AS source
FROM users
UNION ALL
SELECT 'Total Orders' AS metric, CAST(COUNT(*) AS VARCHAR) AS value, 'orders' AS source
FROM orders
UNION ALL
SELECT 'Total Revenue' AS metric, CAST(ROUND(SUM(total_amount), 2) AS VARCHAR) AS value, 'orders' AS source
FROM orders
UNION ALL
SELECT 'Total Customers' AS metric, CAST(COUNT(*) AS VARCHAR) AS value, 'customers' AS source
FROM customers
UNION ALL
SELECT 'Inventory Items' AS metric, CAST(COUNT(*) AS VARCHAR) AS value, 'inventory' AS source
FROM inventory
UNION ALL
SELECT 'Units In Stock' AS metric, CAST(SUM(CAST(quantity AS INTEGER)) AS VARCHAR) AS value, 'inventory' AS source
FROM inventory",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        assert!(lookup("sales_summary").is_some());
        assert!(lookup("no_such_query").is_none());
    }

    #[test]
    fn test_names_match_catalog() {
        let names = names();
        assert_eq!(names.len(), CATALOG.len());
        assert!(names.contains(&"executive_dashboard"));
    }

    #[test]
    fn test_render_substitutes_limit() {
        let q = lookup("top_products").unwrap();
        let sql = q.render(QueryParams {
            limit: Some(25),
            threshold: None,
        });
        assert!(sql.ends_with("LIMIT 25"));
        assert!(!sql.contains("{limit}"));
    }

    #[test]
    fn test_render_clamps_limit() {
        let q = lookup("top_customers").unwrap();
        let high = q.render(QueryParams {
            limit: Some(10_000),
            threshold: None,
        });
        assert!(high.ends_with("LIMIT 100"));

        let zero = q.render(QueryParams {
            limit: Some(0),
            threshold: None,
        });
        assert!(zero.ends_with("LIMIT 1"));
    }

    #[test]
    fn test_render_threshold_default() {
        let q = lookup("low_stock").unwrap();
        let sql = q.render(QueryParams::default());
        assert!(sql.contains("< 100"));
    }

    #[test]
    fn test_catalog_is_read_only() {
        for q in CATALOG {
            let sql = q.render(QueryParams::default());
            assert!(
                crate::validate::check_read_only(&sql).is_ok(),
                "catalog query '{}' tripped the keyword guard",
                q.name
            );
        }
    }
}

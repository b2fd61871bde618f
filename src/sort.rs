use sea_orm::sea_query::Order;

const DEFAULT_SORT_ORDER: &str = "ASC";

/// One ordering clause, resolved to a column when the query is built.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub order: Order,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, order: Order) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, Order::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, Order::Desc)
    }

    /// Parses a sort expression.
    ///
    /// Accepted forms:
    /// - `["title", "DESC"]`: JSON array of column and direction
    /// - `title`: ascending
    /// - `-title`: descending
    ///
    /// Returns `None` for an empty column name or malformed JSON.
    #[must_use]
    pub fn parse(sort: &str) -> Option<Self> {
        let sort = sort.trim();
        let (column, order) = if sort.starts_with('[') {
            let sort_vec: Vec<String> = serde_json::from_str(sort).ok()?;
            let column = sort_vec.first()?.clone();
            let order = sort_vec
                .get(1)
                .map_or(DEFAULT_SORT_ORDER, String::as_str)
                .to_string();
            (column, parse_order(&order))
        } else if let Some(column) = sort.strip_prefix('-') {
            (column.to_string(), Order::Desc)
        } else {
            (sort.to_string(), Order::Asc)
        };

        let column = column.trim().to_string();
        if column.is_empty() {
            return None;
        }
        Some(Self { column, order })
    }
}

/// Anything other than `ASC` (any case) sorts descending.
fn parse_order(sort_order: &str) -> Order {
    if sort_order.trim().eq_ignore_ascii_case("ASC") {
        Order::Asc
    } else {
        Order::Desc
    }
}

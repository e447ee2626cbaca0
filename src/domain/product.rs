use bigdecimal::BigDecimal;

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_active: bool,
}

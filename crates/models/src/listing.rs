use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{BinOper, Expr, Func, SimpleExpr};
use sea_orm::{Condition, QueryOrder, Select};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub salary: String,
    pub tags: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub email: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub requirements: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub benefits: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// All listings, newest first. Equal timestamps fall back to id so the
/// order is stable.
pub fn newest_first() -> Select<Entity> {
    Entity::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

/// `%needle%` with LIKE metacharacters escaped by a backslash.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `LOWER(col) LIKE LOWER(pattern)`: both sides are folded by the database,
/// so a term always compares the same way as the stored text.
fn lower_contains(col: Column, needle: &str) -> SimpleExpr {
    let pattern = SimpleExpr::Binary(
        Box::new(Func::lower(Expr::val(contains_pattern(needle))).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant('\\'.into())),
    );
    Expr::expr(Func::lower(Expr::col((Entity, col)))).binary(BinOper::Like, pattern)
}

/// Keywords match any of title/description/tags/company, location matches
/// city or state, and both groups must hold.
pub fn search_condition(keywords: &str, location: &str) -> Condition {
    let keyword_match = [Column::Title, Column::Description, Column::Tags, Column::Company]
        .into_iter()
        .fold(Condition::any(), |cond, col| cond.add(lower_contains(col, keywords)));
    let location_match = [Column::City, Column::State]
        .into_iter()
        .fold(Condition::any(), |cond, col| cond.add(lower_contains(col, location)));
    Condition::all().add(keyword_match).add(location_match)
}

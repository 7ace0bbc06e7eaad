//! # Query Filters
//!
//! The predicates a consumer can apply to cached reads. Each filter also
//! fixes the ordering, so `observe` and `query` return rows in a stable
//! order and two emissions of the same data compare equal.
//!
//! | Filter                         | SQL                                  |
//! |--------------------------------|--------------------------------------|
//! | `ProductFilter::ActiveOnly`    | `status = 'active'`                  |
//! | `ProductFilter::ByCategory(c)` | `category_id = c`                    |
//! | `CategoryFilter::TopLevel`     | `parent_id IS NULL`                  |
//! | `UserFilter::ByRole(r)`        | `role = r`                           |

use sqlx::{QueryBuilder, Sqlite};

use bazaar_core::{ProductStatus, UserRole};

/// Product predicate. Results are ordered by title, then id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductFilter {
    #[default]
    All,
    /// Only listings visible to customers.
    ActiveOnly,
    ByCategory(String),
    BySeller(String),
    ByStatus(ProductStatus),
}

impl ProductFilter {
    pub(crate) fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            ProductFilter::All => {}
            ProductFilter::ActiveOnly => {
                qb.push(" WHERE status = ")
                    .push_bind(ProductStatus::Active.as_str());
            }
            ProductFilter::ByCategory(id) => {
                qb.push(" WHERE category_id = ").push_bind(id.clone());
            }
            ProductFilter::BySeller(id) => {
                qb.push(" WHERE seller_id = ").push_bind(id.clone());
            }
            ProductFilter::ByStatus(status) => {
                qb.push(" WHERE status = ").push_bind(status.as_str());
            }
        }
        qb.push(" ORDER BY title, id");
    }
}

/// Category predicate. Results are ordered by sort order, then name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    ActiveOnly,
    /// Categories without a parent.
    TopLevel,
    ChildrenOf(String),
}

impl CategoryFilter {
    pub(crate) fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            CategoryFilter::All => {}
            CategoryFilter::ActiveOnly => {
                qb.push(" WHERE is_active = 1");
            }
            CategoryFilter::TopLevel => {
                qb.push(" WHERE parent_id IS NULL");
            }
            CategoryFilter::ChildrenOf(id) => {
                qb.push(" WHERE parent_id = ").push_bind(id.clone());
            }
        }
        qb.push(" ORDER BY sort_order, name, id");
    }
}

/// User predicate. Results are ordered by display name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserFilter {
    #[default]
    All,
    ByRole(UserRole),
}

impl UserFilter {
    pub(crate) fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            UserFilter::All => {}
            UserFilter::ByRole(role) => {
                qb.push(" WHERE role = ").push_bind(role.as_str());
            }
        }
        qb.push(" ORDER BY display_name, id");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(push: impl FnOnce(&mut QueryBuilder<'_, Sqlite>)) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM t");
        push(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_product_filter_sql() {
        assert_eq!(
            sql(|qb| ProductFilter::All.push_sql(qb)),
            "SELECT id FROM t ORDER BY title, id"
        );
        assert_eq!(
            sql(|qb| ProductFilter::ByCategory("c-1".into()).push_sql(qb)),
            "SELECT id FROM t WHERE category_id = ? ORDER BY title, id"
        );
    }

    #[test]
    fn test_category_filter_sql() {
        assert_eq!(
            sql(|qb| CategoryFilter::TopLevel.push_sql(qb)),
            "SELECT id FROM t WHERE parent_id IS NULL ORDER BY sort_order, name, id"
        );
    }

    #[test]
    fn test_user_filter_sql() {
        assert_eq!(
            sql(|qb| UserFilter::ByRole(UserRole::Seller).push_sql(qb)),
            "SELECT id FROM t WHERE role = ? ORDER BY display_name, id"
        );
    }
}

pub mod arrow;
pub mod ddl;
pub mod tables;
pub mod types;

pub use arrow::{map_to_arrow_type, target_type};
pub use ddl::create_table_sql;
pub use tables::{oews_by_state, onet_skills, OEWS_BY_STATE, ONET_SKILLS};
pub use types::{Column, SqlKind, TableDef};

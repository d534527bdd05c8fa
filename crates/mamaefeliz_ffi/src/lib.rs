//! Flutter bridge surface over `mamaefeliz_core`.

pub mod api;

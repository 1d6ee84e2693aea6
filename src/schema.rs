//! Static catalog of the four managed tables. Identifiers used in SQL come only from here.

use std::fmt;

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    /// PostgreSQL type name used for casts when binding (e.g. "numeric", "jsonb").
    pub pg_type: Option<&'static str>,
    pub unique: bool,
}

const fn col(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        pg_type: None,
        unique: false,
    }
}

const fn typed(name: &'static str, pg_type: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        pg_type: Some(pg_type),
        unique: false,
    }
}

const PRODUCT_COLUMNS: &[ColumnDef] = &[
    col("id"),
    col("name"),
    col("sku"),
    typed("price", "numeric"),
    col("type"),
    col("main_image"),
    typed("images", "jsonb"),
    col("image_path"),
    col("image_keywords"),
    col("href"),
    col("describe"),
    col("fqa"),
    col("video_url"),
    col("seo_name"),
    typed("created_at", "timestamptz"),
    typed("updated_at", "timestamptz"),
];

const PRODUCT_TYPE_COLUMNS: &[ColumnDef] = &[
    col("id"),
    ColumnDef {
        name: "type_key",
        pg_type: None,
        unique: true,
    },
    col("type_label"),
    typed("sort", "integer"),
];

const LEAVE_MESSAGE_COLUMNS: &[ColumnDef] = &[
    col("id"),
    col("email"),
    col("first_name"),
    col("last_name"),
    col("content"),
    col("topic"),
    col("phone"),
    typed("created_at", "timestamptz"),
];

const ECLUB_COLUMNS: &[ColumnDef] = &[
    col("id"),
    col("email"),
    typed("created_at", "timestamptz"),
];

/// A table in the remote store. The primary key of every table is an integer `id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Products,
    ProductTypes,
    LeaveMessages,
    Eclub,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Products,
        Table::ProductTypes,
        Table::LeaveMessages,
        Table::Eclub,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Products => "tb_product",
            Table::ProductTypes => "tb_product_type",
            Table::LeaveMessages => "user_leave",
            Table::Eclub => "tb_eclub",
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn columns(self) -> &'static [ColumnDef] {
        match self {
            Table::Products => PRODUCT_COLUMNS,
            Table::ProductTypes => PRODUCT_TYPE_COLUMNS,
            Table::LeaveMessages => LEAVE_MESSAGE_COLUMNS,
            Table::Eclub => ECLUB_COLUMNS,
        }
    }

    pub fn column(self, name: &str) -> Option<&'static ColumnDef> {
        self.columns().iter().find(|c| c.name == name)
    }

    pub fn has_column(self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Singular name used in client-facing messages.
    pub fn noun(self) -> &'static str {
        match self {
            Table::Products => "product",
            Table::ProductTypes => "product type",
            Table::LeaveMessages => "leave message",
            Table::Eclub => "subscription",
        }
    }

    pub const PRIMARY_KEY: &'static str = "id";
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Database row types — these map directly to SQLite rows.
/// Distinct from clinic-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct AppointmentRow {
    pub id: i64,
    pub phone: String,
    pub patient_name: String,
    pub status: String,
    pub created_at: String,
    pub token_number: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct QueueStatusRow {
    pub is_open: bool,
    pub updated_at: String,
}

pub mod header;
pub mod kpi_card;

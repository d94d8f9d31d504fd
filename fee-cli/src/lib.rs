pub mod app;
pub mod logging;
pub mod price_list;

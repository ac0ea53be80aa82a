pub mod api;
pub mod form;
pub mod list_view;

pub mod reply_html;
pub use reply_html::reply_html;

mod html;

pub use html::to_html;

/// HTTP shell: page layout, plotly translation and the axum server.

pub mod layout;
pub mod plot;
pub mod server;

use axum::{
    extract::State,
    response::Html,
};

use crate::state::AppState;

pub async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>Jenkins Exporter</title></head>\n\
         <body>\n\
         <h1>Jenkins Exporter</h1>\n\
         <p>Polling {}</p>\n\
         <p><a href=\"/metrics\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        escape_html(state.target())
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

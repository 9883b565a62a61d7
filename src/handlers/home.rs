use axum::response::Html;

/// Landing page, embedded at compile time and served as static content
pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

use crate::helpers::spawn_app;

#[tokio::test]
async fn the_landing_page_contains_the_waitlist_form() {
    let app = spawn_app().await;

    let html = app.get_home_html().await;

    assert!(html.contains("SmartRisk"));
    assert!(html.contains("Join the Waitlist"));
    assert!(html.contains(r#"type="email""#));
}

//! A ready-to-run application with a home page and HTML error pages.

use crate::app::application::Application;
use crate::app::error::Error;
use crate::app::response::Body;

fn simple_html(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n<head><title>{title}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    )
}

/// Return an application with a default home page on `GET /` and a
/// fallback error page for every error status.
pub fn cube() -> Result<Application, Error> {
    let mut app = Application::new();
    let server_name = app.config.server_name.clone();

    let home_page = simple_html(
        "It works!",
        "<h1>It works!</h1>\n<p>This is the default microweb-rs page.</p>",
    );
    app.get("/", move |_| Ok(home_page.clone().into()))?;

    app.fallback_error(move |ctx| {
        let status_line = ctx.response.status_line();
        let page = simple_html(
            &status_line,
            &format!(
                "<h1>{status_line}</h1>\n<p>{detail}</p>\n<hr>\n<address>{server_name}</address>",
                detail = ctx.response.status_detail(),
            ),
        );
        Ok(Body::Text(page))
    });

    Ok(app)
}

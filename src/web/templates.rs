//! Page templates, compiled into the binary.

use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("❌ Template {} failed to compile: {}", name, e);
        }
    }
    env
});

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("_card.html", include_str!("../../templates/_card.html")),
    ("_pagination.html", include_str!("../../templates/_pagination.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("list.html", include_str!("../../templates/list.html")),
    ("detail.html", include_str!("../../templates/detail.html")),
    ("search.html", include_str!("../../templates/search.html")),
    ("contact.html", include_str!("../../templates/contact.html")),
    ("404.html", include_str!("../../templates/404.html")),
    ("500.html", include_str!("../../templates/500.html")),
];

/// Render `name` with `ctx`
pub fn render<S: Serialize>(name: &str, ctx: S) -> Result<String, minijinja::Error> {
    ENV.get_template(name)?.render(ctx)
}

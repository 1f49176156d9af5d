//! Page shell: layout, navigation, titles and footer. No logic.

use crate::config::{AppVariant, PageConfig};

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; color: #262730; }
nav { width: 14rem; padding: 1.5rem; background: #f0f2f6; }
nav ul { list-style: none; padding: 0; }
nav a { display: block; padding: .4rem .6rem; color: inherit; text-decoration: none; border-radius: .3rem; }
nav a.active { background: #ff4b4b; color: #fff; }
main { flex: 1; max-width: 46rem; margin: 0 auto; padding: 2rem; }
.field { margin-bottom: 1rem; display: flex; flex-direction: column; gap: .3rem; }
button { padding: .5rem 1rem; border: 1px solid #ff4b4b; background: #fff; border-radius: .3rem; cursor: pointer; }
.alert { padding: .8rem 1rem; border-radius: .3rem; margin: 1rem 0; }
.alert.success { background: #dff5e3; color: #1b5e20; }
.alert.error { background: #fde2e2; color: #8b0000; }
.columns { display: flex; gap: 2rem; }
.columns > div { flex: 1; }
"#;

/// Navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Prediction,
}

impl NavItem {
    const ALL: [NavItem; 2] = [NavItem::Home, NavItem::Prediction];

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Home => "Home",
            NavItem::Prediction => "Prediction",
        }
    }

    pub fn href(&self) -> &'static str {
        match self {
            NavItem::Home => "/",
            NavItem::Prediction => "/predict",
        }
    }
}

/// Static frame shared by every page
#[derive(Debug, Clone)]
pub struct PageShell {
    title: String,
    icon: String,
    variant: AppVariant,
}

impl PageShell {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            title: config.page_title.clone(),
            icon: config.page_icon.clone(),
            variant: config.variant,
        }
    }

    pub fn variant(&self) -> AppVariant {
        self.variant
    }

    /// Wrap a body fragment in the full document
    pub fn render(&self, active: NavItem, body: &str) -> String {
        let nav: String = NavItem::ALL
            .iter()
            .map(|item| {
                let class = if *item == active { " class=\"active\"" } else { "" };
                format!(
                    "<li><a href=\"{}\"{}>{}</a></li>",
                    item.href(),
                    class,
                    item.label()
                )
            })
            .collect();

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{icon} {title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
             <nav><h2>Navigation</h2><ul>{nav}</ul></nav>\n\
             <main>\n<h1>{icon} Machine Learning Prediction App</h1>\n\
             <p>This app predicts output based on user input features.</p>\n\
             {body}\
             <hr>\n<footer>Built with ❤️ using Rust</footer>\n</main>\n</body>\n</html>\n",
            icon = escape(&self.icon),
            title = escape(&self.title),
        )
    }

    /// Project overview page
    pub fn home(&self) -> String {
        let body = "<h2>📌 Project Overview</h2>\n\
             <p>This Machine Learning model was built using:</p>\n\
             <ul><li>Data Cleaning</li><li>Feature Engineering</li>\
             <li>Feature Selection</li><li>Model Training</li></ul>\n\
             <p>Enter values in the <a href=\"/predict\">Prediction</a> section to get results.</p>\n";
        self.render(NavItem::Home, body)
    }

    /// Prediction page around an already-rendered form and result block
    pub fn prediction(&self, form: &str, result: &str) -> String {
        let body = format!("<h2>🔍 Make a Prediction</h2>\n{}{}", form, result);
        self.render(NavItem::Prediction, &body)
    }
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

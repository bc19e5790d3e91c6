use std::path::Path;

use crate::errors::TemplateError;
use serde::Serialize;
use tera::{Context, Tera};

/// URL path the stylesheet is served from.
pub const STYLESHEET_PATH: &str = "/.asamblea/styles.css";

const STYLESHEET_FILE: &str = "asamblea.css";

/// Data for the page layout that wraps content and fragments.
#[derive(Debug, Serialize)]
pub struct PageView<'a> {
    pub lang: &'a str,
    pub title: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Notice {
    /// `success` or `error`; becomes part of a CSS class.
    pub kind: &'static str,
    pub text: String,
}

/// Data for the admin settings page.
#[derive(Debug, Serialize)]
pub struct AdminView<'a> {
    pub lang: &'a str,
    pub title: &'a str,
    pub action: &'a str,
    pub nonce: &'a str,
    pub current_url: &'a str,
    pub notice: Option<Notice>,
    pub url_label: &'a str,
    pub url_placeholder: &'a str,
    pub url_description: &'a str,
    pub submit_label: &'a str,
    pub usage_heading: &'a str,
    pub usage_text: &'a str,
    pub shortcode: &'a str,
}

#[derive(Clone)]
pub struct Templates {
    tera: Tera,
    stylesheet: String,
}

impl Templates {
    /// Load templates, letting files in `override_folder` replace the
    /// compiled-in defaults of the same name.
    pub fn new(override_folder: Option<&Path>) -> Result<Self, TemplateError> {
        let mut tera = match override_folder {
            Some(folder) => {
                let globs = folder.join("**/*.html");
                let globs_str = globs.to_str().ok_or(TemplateError::InvalidPathEncoding)?;
                Tera::new(globs_str).map_err(|source| TemplateError::InitFailed {
                    path: folder.to_path_buf(),
                    source,
                })?
            }
            None => Tera::default(),
        };

        for (name, tpl) in DEFAULT_TEMPLATES.iter() {
            if tera.get_template(name).is_err() {
                tracing::debug!("Adding default template {}", name);
                tera.add_raw_template(name, tpl)?;
            }
        }

        let stylesheet = override_folder
            .map(|folder| folder.join(STYLESHEET_FILE))
            .and_then(|path| std::fs::read_to_string(path).ok())
            .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());

        Ok(Templates { tera, stylesheet })
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    pub fn render_page(&self, page: &PageView<'_>) -> Result<String, TemplateError> {
        let mut context = Context::from_serialize(page)?;
        context.insert("stylesheet_href", STYLESHEET_PATH);
        self.render("page.html", &context)
    }

    pub fn render_admin(&self, view: &AdminView<'_>) -> Result<String, TemplateError> {
        let mut context = Context::from_serialize(view)?;
        context.insert("stylesheet_href", STYLESHEET_PATH);
        self.render("admin.html", &context)
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String, TemplateError> {
        self.tera
            .render(template_name, context)
            .map_err(|e| TemplateError::RenderFailed {
                template_name: template_name.to_string(),
                source: e,
            })
    }
}

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("page.html", include_str!("../templates/page.html")),
    ("admin.html", include_str!("../templates/admin.html")),
];

const DEFAULT_STYLESHEET: &str = include_str!("../templates/asamblea.css");

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn admin_view<'a>(current_url: &'a str, notice: Option<Notice>) -> AdminView<'a> {
        AdminView {
            lang: "es",
            title: "Asamblea en Vivo - Configuración",
            action: "/admin/settings",
            nonce: "abc123",
            current_url,
            notice,
            url_label: "URL de YouTube",
            url_placeholder: "https://youtu.be/VIDEO_ID",
            url_description: "Ingrese la URL",
            submit_label: "Guardar configuración",
            usage_heading: "Uso del Shortcode",
            usage_text: "Use:",
            shortcode: "[asamblea_live]",
        }
    }

    #[test]
    fn test_page_keeps_body_markup_and_links_stylesheet() {
        let templates = Templates::new(None).unwrap();
        let html = templates
            .render_page(&PageView {
                lang: "es",
                title: "Asamblea <en vivo>",
                body: "<div class=\"x\">hi</div>",
            })
            .unwrap();
        assert!(html.contains("<div class=\"x\">hi</div>"));
        assert!(html.contains("<title>Asamblea &lt;en vivo&gt;</title>"));
        assert!(html.contains(STYLESHEET_PATH));
        assert!(html.contains(r#"<html lang="es">"#));
    }

    #[test]
    fn test_admin_escapes_current_url() {
        let templates = Templates::new(None).unwrap();
        let html = templates
            .render_admin(&admin_view(r#"https://x.test/?a=1&b="2""#, None))
            .unwrap();
        assert!(html.contains("value=\"https:&#x2F;&#x2F;x.test&#x2F;?a=1&amp;b=&quot;2&quot;\""));
        assert!(html.contains(r#"name="_nonce" value="abc123""#));
        assert!(html.contains("[asamblea_live]"));
        assert!(!html.contains("notice-"));
    }

    #[test]
    fn test_admin_notice() {
        let templates = Templates::new(None).unwrap();
        let notice = Notice {
            kind: "success",
            text: "Configuración guardada correctamente.".to_string(),
        };
        let html = templates.render_admin(&admin_view("", Some(notice))).unwrap();
        assert!(html.contains(r#"class="notice notice-success""#));
        assert!(html.contains("Configuración guardada correctamente."));
    }

    #[test]
    fn test_default_stylesheet_has_breakpoints() {
        let templates = Templates::new(None).unwrap();
        let css = templates.stylesheet();
        assert!(css.contains("padding-bottom: 56.25%"));
        for bp in ["480px", "768px", "1024px"] {
            assert!(css.contains(bp), "missing breakpoint {bp}");
        }
    }

    #[test]
    fn test_override_folder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("page.html"), "CUSTOM {{ body | safe }}").unwrap();
        std::fs::write(dir.path().join("asamblea.css"), "body{}").unwrap();
        let templates = Templates::new(Some(dir.path())).unwrap();
        let html = templates
            .render_page(&PageView {
                lang: "es",
                title: "t",
                body: "<b>x</b>",
            })
            .unwrap();
        assert_eq!(html, "CUSTOM <b>x</b>");
        assert_eq!(templates.stylesheet(), "body{}");
        // admin.html falls back to the compiled default
        assert!(templates.render_admin(&admin_view("", None)).is_ok());
    }
}

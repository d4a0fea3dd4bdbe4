//! HTML presenter
//!
//! Renders the verification page with handlebars. Values coming from the
//! spreadsheet are escaped by the template engine; the PDF link is only
//! emitted for http(s) URLs.

use handlebars::Handlebars;
use serde::Serialize;
use url::Url;

use crate::config::PageConfig;
use crate::lookup::Certificate;
use crate::service::{with_detail, Verdict, MISSING_INPUT_MESSAGE, NOT_FOUND_MESSAGE};

const PAGE_TEMPLATE: &str = include_str!("../../templates/page.hbs");

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    title: &'a str,
    heading: &'a str,
    logo_path: Option<&'a str>,
    show_form: bool,
    code: &'a str,
    warning: Option<&'a str>,
    error: Option<String>,
    found: Option<FoundView<'a>>,
}

#[derive(Debug, Serialize)]
struct FoundView<'a> {
    full_name: &'a str,
    event_name: &'a str,
    issued_on: &'a str,
    pdf_url: &'a str,
    pdf_linkable: bool,
}

impl<'a> FoundView<'a> {
    fn new(cert: &'a Certificate) -> Self {
        Self {
            full_name: &cert.full_name,
            event_name: &cert.event_name,
            issued_on: &cert.issued_on,
            pdf_url: &cert.pdf_url,
            pdf_linkable: is_web_link(&cert.pdf_url),
        }
    }
}

fn is_web_link(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

pub struct Presenter {
    handlebars: Handlebars<'static>,
    page: PageConfig,
    show_error_detail: bool,
}

impl Presenter {
    pub fn new(page: PageConfig, show_error_detail: bool) -> Result<Self, handlebars::TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("page", PAGE_TEMPLATE)?;
        Ok(Self {
            handlebars,
            page,
            show_error_detail,
        })
    }

    /// Render the page for `code` and, when a lookup ran, its verdict.
    ///
    /// A configuration failure renders the error alone, without the form.
    pub fn render(&self, code: &str, verdict: Option<&Verdict>) -> Result<String, handlebars::RenderError> {
        let mut ctx = PageContext {
            title: &self.page.title,
            heading: &self.page.heading,
            logo_path: self.page.logo_path.as_deref(),
            show_form: true,
            code,
            warning: None,
            error: None,
            found: None,
        };

        match verdict {
            None => {}
            Some(Verdict::Found(cert)) => ctx.found = Some(FoundView::new(cert)),
            Some(Verdict::MissingInput) => ctx.warning = Some(MISSING_INPUT_MESSAGE),
            Some(Verdict::NotFound { .. }) => ctx.error = Some(NOT_FOUND_MESSAGE.to_string()),
            Some(Verdict::LookupFailed(e)) => {
                ctx.error = Some(with_detail(e.user_message(), e, self.show_error_detail))
            }
            Some(Verdict::ConfigurationFailed(e)) => {
                ctx.show_form = false;
                ctx.error = Some(with_detail(e.user_message(), e, self.show_error_detail));
            }
        }

        self.handlebars.render("page", &ctx)
    }
}

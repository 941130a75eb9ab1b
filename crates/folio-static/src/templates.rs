//! Template engine for rendering post pages.

use minijinja::{context, Environment};

/// Cover image of a post page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Cover {
    /// CDN URL
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// Context for rendering a post template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PostContext {
    /// Post title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Base URL
    pub base_url: String,
    pub excerpt: String,
    /// Formatted creation date
    pub date: String,
    /// Cover image, if the post has one
    pub cover: Option<Cover>,
    /// Rendered body HTML
    pub body: String,
    /// Live update endpoint, only set in draft mode
    pub live_endpoint: Option<String>,
    /// Document revision the page was rendered from
    pub rev: String,
    /// Paths to CSS stylesheets to include
    pub styles: Vec<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("post.html", POST_TEMPLATE),
            ("post_section.html", POST_SECTION_TEMPLATE),
            ("not_found.html", NOT_FOUND_TEMPLATE),
            ("error.html", ERROR_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("built-in templates are valid");
        }

        Self { env }
    }

    /// Render a full post page.
    pub fn render_post(&self, context: &PostContext) -> Result<String, minijinja::Error> {
        self.render_post_template("post.html", context)
    }

    /// Render only the post section, as swapped in by live updates.
    pub fn render_post_section(&self, context: &PostContext) -> Result<String, minijinja::Error> {
        self.render_post_template("post_section.html", context)
    }

    fn render_post_template(
        &self,
        template: &str,
        context: &PostContext,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            title => &context.title,
            site_title => &context.site_title,
            base_url => &context.base_url,
            excerpt => &context.excerpt,
            date => &context.date,
            cover => &context.cover,
            body => &context.body,
            live_endpoint => &context.live_endpoint,
            rev => &context.rev,
            styles => &context.styles,
        })
    }

    /// Render the not-found page.
    pub fn render_not_found(
        &self,
        site_title: &str,
        base_url: &str,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("not_found.html")?.render(context! {
            title => "Page not found",
            site_title => site_title,
            base_url => base_url,
            styles => Vec::<String>::new(),
        })
    }

    /// Render the error page shown when a route fails to generate.
    pub fn render_error(
        &self,
        site_title: &str,
        base_url: &str,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("error.html")?.render(context! {
            title => "Something went wrong",
            site_title => site_title,
            base_url => base_url,
            styles => Vec::<String>::new(),
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site_title }}</title>
  {% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}<link rel="stylesheet" href="{{ base_url }}assets/main.css">
</head>
<body>
  <div class="container">
    <header class="header">
      <a href="{{ base_url }}" class="header__title">{{ site_title }}</a>
    </header>
    <main>
      {% block content %}{% endblock %}
    </main>
  </div>
  {% if live_endpoint %}<script src="{{ base_url }}assets/live.js" data-live="{{ live_endpoint }}" data-rev="{{ rev }}"></script>{% endif %}
</body>
</html>"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
{% include "post_section.html" %}
{% endblock %}"##;

const POST_SECTION_TEMPLATE: &str = r##"<section class="post">
  {% if cover %}
  <img class="post__cover" src="{{ cover.src }}" width="{{ cover.width }}" height="{{ cover.height }}" alt="">
  {% else %}
  <div class="post__cover--none"></div>
  {% endif %}
  <div class="post__container">
    <h1 class="post__title">{{ title }}</h1>
    <p class="post__excerpt">{{ excerpt }}</p>
    <p class="post__date">{{ date }}</p>
    <div class="post__content">
      {{ body | safe }}
    </div>
  </div>
</section>"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="status">
  <h1 class="status__code">404</h1>
  <p class="status__message">This page could not be found.</p>
</section>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="status">
  <h1 class="status__code">500</h1>
  <p class="status__message">This page could not be generated. Please try again later.</p>
</section>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PostContext {
        PostContext {
            title: "Hello <world>".to_string(),
            site_title: "My Blog".to_string(),
            base_url: "/".to_string(),
            excerpt: "An excerpt".to_string(),
            date: "October 14, 2026".to_string(),
            cover: None,
            body: "<p>Body</p>".to_string(),
            live_endpoint: None,
            rev: "rev-1".to_string(),
            styles: vec![],
        }
    }

    #[test]
    fn renders_post_page() {
        let html = TemplateEngine::new().render_post(&context()).unwrap();

        assert!(html.contains("<title>Hello &lt;world&gt; - My Blog</title>"));
        assert!(html.contains(r#"<h1 class="post__title">Hello &lt;world&gt;</h1>"#));
        assert!(html.contains(r#"<p class="post__date">October 14, 2026</p>"#));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains("post__cover--none"));
    }

    #[test]
    fn renders_cover_image() {
        let mut ctx = context();
        ctx.cover = Some(Cover {
            src: "https://cdn.example/cover.jpg?fit=max&auto=format".to_string(),
            width: 367,
            height: 231,
        });

        let html = TemplateEngine::new().render_post(&ctx).unwrap();

        assert!(html.contains(r#"class="post__cover""#));
        assert!(html.contains(r#"width="367" height="231""#));
        assert!(!html.contains("post__cover--none"));
    }

    #[test]
    fn live_script_only_with_endpoint() {
        let engine = TemplateEngine::new();

        let published = engine.render_post(&context()).unwrap();
        assert!(!published.contains("live.js"));

        let mut ctx = context();
        ctx.live_endpoint = Some("/__live/post/hello".to_string());
        let draft = engine.render_post(&ctx).unwrap();
        assert!(draft.contains("assets/live.js"));
        assert!(draft.contains("data-live="));
        assert!(draft.contains("__live"));
        assert!(draft.contains(r#"data-rev="rev-1""#));
    }

    #[test]
    fn section_has_no_document_shell() {
        let html = TemplateEngine::new().render_post_section(&context()).unwrap();

        assert!(html.starts_with(r#"<section class="post">"#));
        assert!(!html.contains("<html"));
    }

    #[test]
    fn renders_status_pages() {
        let engine = TemplateEngine::new();

        assert!(engine.render_not_found("Blog", "/").unwrap().contains("404"));
        assert!(engine.render_error("Blog", "/").unwrap().contains("500"));
    }
}

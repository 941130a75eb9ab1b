//! Asset pipeline for the site stylesheet and the live preview client.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the live preview client.
    ///
    /// The script reads its socket path from its own `data-live` attribute
    /// and swaps the post section for each pushed update. Only draft pages
    /// load it.
    pub fn live_client_script() -> String {
        LIVE_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* Folio post page */

:root {
  --content-max-width: 720px;
  --background: #ffffff;
  --foreground: #1a1a1a;
  --muted: #6b6b6b;
  --border: #e5e5e5;
  --accent: #2f5bea;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.container {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 2rem 1rem;
}

.header {
  margin-bottom: 2rem;
}

.header__title {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.post__cover {
  width: 100%;
  height: auto;
  border-radius: 0.5rem;
  object-fit: cover;
}

.post__cover--none {
  width: 100%;
  aspect-ratio: 367 / 231;
  border-radius: 0.5rem;
  background: var(--border);
}

.post__container {
  margin-top: 1.5rem;
}

.post__title {
  font-size: 2.25rem;
  line-height: 1.2;
  margin-bottom: 0.75rem;
}

.post__excerpt {
  font-size: 1.125rem;
  color: var(--muted);
}

.post__date {
  margin-top: 0.5rem;
  font-size: 0.875rem;
  color: var(--muted);
}

.post__content {
  margin-top: 2rem;
}

.post__content p,
.post__content ul,
.post__content ol,
.post__content blockquote {
  margin-bottom: 1rem;
}

.post__content h1,
.post__content h2,
.post__content h3,
.post__content h4 {
  margin: 2rem 0 0.75rem;
  line-height: 1.3;
}

.post__content ul,
.post__content ol {
  padding-left: 1.5rem;
}

.post__content blockquote {
  border-left: 3px solid var(--border);
  padding-left: 1rem;
  color: var(--muted);
}

.post__content code {
  font-family: ui-monospace, monospace;
  background: var(--border);
  padding: 0.1rem 0.3rem;
  border-radius: 0.25rem;
}

.post__content a {
  color: var(--accent);
}

.post__content img {
  max-width: 100%;
}

.status {
  text-align: center;
  padding: 4rem 0;
}

.status__code {
  font-size: 3rem;
}

.status__message {
  color: var(--muted);
}
"#;

const LIVE_JS: &str = r#"// Folio live preview client
(function() {
  'use strict';

  const script = document.currentScript;
  const endpoint = script && script.dataset.live;
  if (!endpoint) return;

  const url = new URL(endpoint, location.href);
  url.protocol = url.protocol === 'https:' ? 'wss:' : 'ws:';
  if (script.dataset.rev) url.searchParams.set('rev', script.dataset.rev);
  const ws = new WebSocket(url.href);

  ws.onmessage = function(event) {
    const msg = JSON.parse(event.data);

    switch (msg.type) {
      case 'update':
        const section = document.querySelector('section.post');
        if (section) {
          section.outerHTML = msg.html;
        } else {
          location.reload();
        }
        break;

      case 'connected':
        console.log('[live] Connected');
        break;
    }
  };

  ws.onclose = function() {
    console.log('[live] Disconnected');
  };

  ws.onerror = function(e) {
    console.error('[live] WebSocket error:', e);
  };
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(":root"));
        assert!(css.contains(".post__cover--none"));
        assert!(css.contains(".post__content"));
    }

    #[test]
    fn live_client_swaps_post_section() {
        let js = AssetPipeline::live_client_script();
        assert!(js.contains("dataset.live"));
        assert!(js.contains("section.post"));
        assert!(js.contains("new URL(endpoint, location.href)"));
        assert!(js.contains("dataset.rev"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.post__title {
    font-size: 2rem;
    margin-bottom: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".post__title"));
    }

    #[test]
    fn minifies_site_css() {
        let minified = AssetPipeline::minify_css(&AssetPipeline::generate_css()).unwrap();
        assert!(minified.len() < DEFAULT_CSS.len());
    }
}

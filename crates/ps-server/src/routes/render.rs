//! Server-side HTML for the image list.

use ps_images::ImageEntry;

const LIST_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>pixshelf - images</title>
    <style>
     .row { display: flex; align-items: center; }
     .col { flex: 1; }
    </style>
    <script>
    function delImage(button) {
      var key = button.dataset.key;
      if (!window.confirm("Delete " + key + "?")) {
        return;
      }
      fetch('/images/' + encodeURIComponent(key), { method: 'DELETE' })
        .then(function () { window.location.reload(); });
    }

    function patchImage(form) {
      var key = form.dataset.key;
      fetch('/images/' + encodeURIComponent(key), { method: 'PATCH', body: new FormData(form) })
        .then(function () { window.location.reload(); });
      return false;
    }
    </script>
</head>
<body>
<div>
    <a href="/">Back</a>
    <h1>Uploaded images</h1>
    <ul>
"#;

const LIST_TAIL: &str = r#"    </ul>
</div>
</body>
</html>
"#;

/// Escape text for use in HTML element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the list page. Thumbnails are inlined as PNG data URIs.
pub fn list_page(entries: &[ImageEntry]) -> String {
    let mut html = String::from(LIST_HEAD);

    for entry in entries {
        let key = escape_html(&entry.key);
        let href = escape_html(&urlencoding::encode(&entry.key));
        html.push_str(&format!(
            r#"      <li class="row">
        <div class="col"><img src="data:image/png;base64,{thumb}" alt="thumbnail {key}"></div>
        <div class="col"><a href="/images/{href}" target="_blank">{key}</a></div>
        <div class="col">
          <form data-key="{key}" enctype="multipart/form-data" onsubmit="return patchImage(this);">
            <input type="file" name="file">
            <input type="submit" value="Replace">
          </form>
        </div>
        <div class="col"><button data-key="{key}" onclick="delImage(this);">Delete</button></div>
      </li>
"#,
            thumb = entry.thumb,
        ));
    }

    if entries.is_empty() {
        html.push_str("      <li>No images yet.</li>\n");
    }

    html.push_str(LIST_TAIL);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> ImageEntry {
        ImageEntry {
            key: key.into(),
            thumb: "iVBORw0KGgo=".into(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn renders_each_entry() {
        let html = list_page(&[entry("cat.png"), entry("dog.gif")]);
        assert!(html.contains(r#"<a href="/images/cat.png" target="_blank">cat.png</a>"#));
        assert!(html.contains(r#"data-key="dog.gif""#));
        assert!(html.contains("data:image/png;base64,iVBORw0KGgo="));
        assert!(!html.contains("No images yet."));
    }

    #[test]
    fn keys_are_escaped_and_encoded() {
        let html = list_page(&[entry("<b>&co 1.png")]);
        assert!(html.contains("&lt;b&gt;&amp;co 1.png"));
        assert!(html.contains(r#"href="/images/%3Cb%3E%26co%201.png""#));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn empty_list() {
        let html = list_page(&[]);
        assert!(html.contains("No images yet."));
        assert!(html.ends_with("</html>\n"));
    }
}

//! Server-side HTML. Every function here is pure: typed data in, markup out.

mod components;
mod pages;

pub use components::{feed_section, hero, movie_grid};
pub(crate) use components::hero_loading;
pub use pages::{
    about_page, contact_page, detail_error_page, detail_not_found_page, detail_page, home_page,
    listing_head, listing_page, not_found_page,
};

pub const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="500" height="750" viewBox="0 0 500 750"><rect width="500" height="750" fill="#1f2937"/><path d="M200 330h100v90H200z" fill="none" stroke="#6b7280" stroke-width="8"/><circle cx="230" cy="355" r="10" fill="#6b7280"/></svg>"##;

const SITE_NAME: &str = "Cinematic Vistas";

const STYLE: &str = r#"
body{margin:0;font-family:system-ui,sans-serif;background:#0b0f17;color:#e5e7eb}
a{color:inherit}
header.nav,footer{padding:1rem 2rem;background:#111827}
header.nav{display:flex;gap:2rem;align-items:center;flex-wrap:wrap}
header.nav a.active{font-weight:700;text-decoration:underline}
header.nav{position:sticky;top:0;z-index:50;transition:box-shadow .3s}
header.nav.scrolled{box-shadow:0 1px 8px rgba(0,0,0,.6)}
.menu-toggle{display:none}
@media (max-width:768px){header.nav nav{display:none;width:100%;flex-direction:column}header.nav nav.open{display:flex}.menu-toggle{display:block}}
main{min-height:70vh}
.container{max-width:1200px;margin:0 auto;padding:1.5rem}
.hero{position:relative;min-height:60vh;background-size:cover;background-position:center;display:flex;align-items:flex-end}
.hero .content{padding:3rem 2rem;background:linear-gradient(transparent,#0b0f17);width:100%}
.row{display:flex;overflow-x:auto;gap:1rem;scroll-snap-type:x mandatory;padding-bottom:1rem}
.row>*{flex:0 0 200px;scroll-snap-align:start}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:1rem}
.card img{width:100%;aspect-ratio:2/3;object-fit:cover;border-radius:.5rem}
.placeholder{aspect-ratio:2/3;border-radius:.5rem;background:#1f2937}
.notice{padding:3rem 1rem;text-align:center;color:#9ca3af}
.section-head{display:flex;justify-content:space-between;align-items:flex-end}
.controls button[disabled]{opacity:.5;cursor:not-allowed}
.chip{display:inline-block;padding:.25rem .75rem;margin:.2rem;border:1px solid #374151;border-radius:999px;text-decoration:none}
.chip.active{background:#e5e7eb;color:#0b0f17}
.error{color:#f87171}
"#;

// Loads deferred sections and wires the carousel controls. The scroll rule
// mirrors crate::carousel; its constants come from the row's data attributes.
const SCRIPT: &str = r#"
(function () {
  function bindCarousels() {
    document.querySelectorAll('[data-carousel]:not([data-bound])').forEach(function (root) {
      root.setAttribute('data-bound', '');
      var track = root.querySelector('[data-track]');
      var left = root.querySelector('[data-scroll="left"]');
      var right = root.querySelector('[data-scroll="right"]');
      if (!track || !left || !right) return;
      var eps = parseFloat(root.dataset.epsilon);
      var step = parseFloat(root.dataset.step);
      function update() {
        var max = track.scrollWidth - track.clientWidth;
        if (max <= 0) { left.disabled = true; right.disabled = true; return; }
        left.disabled = !(track.scrollLeft > 0);
        right.disabled = !(track.scrollLeft < max - eps);
      }
      function go(sign) {
        track.scrollTo({ left: track.scrollLeft + sign * track.clientWidth * step, behavior: 'smooth' });
      }
      left.addEventListener('click', function () { go(-1); });
      right.addEventListener('click', function () { go(1); });
      track.addEventListener('scroll', update);
      update();
    });
  }
  function loadFragments() {
    document.querySelectorAll('[data-fragment]').forEach(function (el) {
      var src = el.getAttribute('data-fragment');
      el.removeAttribute('data-fragment');
      fetch(src).then(function (res) { return res.text(); }).then(function (html) {
        el.outerHTML = html;
        bindCarousels();
      }).catch(function () {
        el.innerHTML = '<p class="notice error" role="alert">Unable to load movies at this time.</p>';
      });
    });
  }
  function bindHeader() {
    var header = document.querySelector('header.nav');
    var toggle = document.querySelector('[data-menu-toggle]');
    var menu = document.getElementById('site-menu');
    if (!header) return;
    function onScroll() { header.classList.toggle('scrolled', window.scrollY > 10); }
    window.addEventListener('scroll', onScroll);
    onScroll();
    if (!toggle || !menu) return;
    toggle.addEventListener('click', function () {
      var open = menu.classList.toggle('open');
      toggle.setAttribute('aria-expanded', open ? 'true' : 'false');
    });
  }
  bindHeader();
  bindCarousels();
  loadFragments();
})();
"#;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encodes what would end or escape a quoted CSS `url('...')`.
/// Attribute values are entity-decoded before CSS sees them.
pub(crate) fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            '\'' | '"' | '(' | ')' | '\\' | '<' | '>' => {
                out.push_str(&format!("%{:02X}", ch as u32));
            }
            c if c.is_whitespace() || c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Movies,
    About,
    Contact,
    Other,
}

const NAV_LINKS: [(NavItem, &str, &str); 4] = [
    (NavItem::Home, "Home", "/"),
    (NavItem::Movies, "Movies", "/movies"),
    (NavItem::About, "About", "/about"),
    (NavItem::Contact, "Contact", "/contact"),
];

fn navbar(active: NavItem) -> String {
    let links: String = NAV_LINKS
        .iter()
        .map(|(item, label, href)| {
            let class = if *item == active { " class=\"active\"" } else { "" };
            format!("<a href=\"{href}\"{class}>{label}</a>")
        })
        .collect();
    format!(
        "<header class=\"nav\"><a href=\"/\"><strong>CINEMATIC</strong> VISTAS</a>\
<button type=\"button\" class=\"menu-toggle\" data-menu-toggle aria-controls=\"site-menu\" aria-expanded=\"false\" aria-label=\"Toggle menu\">&#9776;</button>\
<nav id=\"site-menu\">{links}</nav>{}</header>",
        search_bar("")
    )
}

/// GET form, so a submitted search lands in the URL.
pub(crate) fn search_bar(value: &str) -> String {
    format!(
        "<form class=\"search\" action=\"/movies\" method=\"get\" role=\"search\">\
<input type=\"search\" name=\"search\" placeholder=\"Search for movies...\" value=\"{}\" required>\
<button type=\"submit\">Search</button></form>",
        escape_html(value)
    )
}

const FOOTER_GENRES: [(u32, &str); 5] = [
    (28, "Action"),
    (12, "Adventure"),
    (35, "Comedy"),
    (18, "Drama"),
    (27, "Horror"),
];

fn footer() -> String {
    let year = chrono::Local::now().format("%Y");
    let categories: String = FOOTER_GENRES
        .iter()
        .map(|(id, name)| format!("<li><a href=\"/movies?genre={id}\">{name}</a></li>"))
        .collect();
    format!(
        "<footer><p>Your premier destination for exploring the world of cinema.</p>\
<ul class=\"explore\"><li><a href=\"/\">Home</a></li><li><a href=\"/movies\">Movies</a></li>\
<li><a href=\"/about\">About</a></li><li><a href=\"/contact\">Contact</a></li></ul>\
<ul class=\"categories\">{categories}</ul>\
<p>&copy; {year} {SITE_NAME}. All rights reserved.</p></footer>"
    )
}

pub(crate) fn layout(title: &str, active: NavItem, body: &str) -> String {
    let full_title = if title.is_empty() {
        SITE_NAME.to_string()
    } else {
        format!("{} | {SITE_NAME}", escape_html(title))
    };
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{full_title}</title><style>{STYLE}</style></head><body>{}<main>{body}</main>{}\
<script>{SCRIPT}</script></body></html>",
        navbar(active),
        footer()
    )
}

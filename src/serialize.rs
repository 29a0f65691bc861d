//! `innerHTML` serialization through html5ever, with a hook to rewrite
//! `<img src>` on the way out.

use html5ever::serialize::{
    AttrRef, HtmlSerializer, Serialize, SerializeOpts, Serializer, TraversalScope,
};
use html5ever::QualName;
use scraper::ElementRef;
use std::borrow::Cow;
use std::io;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Forwards to an inner serializer, replacing the `src` of HTML `<img>`
/// elements when `rewrite` returns a value.
struct ImgSrcRewriter<'f, S, F> {
    inner: S,
    rewrite: &'f F,
}

fn is_html_img(name: &QualName) -> bool {
    &*name.local == "img" && &*name.ns == HTML_NS
}

fn is_plain_src(name: &QualName) -> bool {
    &*name.local == "src" && name.prefix.is_none() && name.ns.is_empty()
}

impl<S, F> Serializer for ImgSrcRewriter<'_, S, F>
where
    S: Serializer,
    F: Fn(&str) -> Option<String>,
{
    fn start_elem<'a, AttrIter>(&mut self, name: QualName, attrs: AttrIter) -> io::Result<()>
    where
        AttrIter: Iterator<Item = AttrRef<'a>>,
    {
        if !is_html_img(&name) {
            return self.inner.start_elem(name, attrs);
        }
        let rewrite = self.rewrite;
        let attrs: Vec<(&QualName, Cow<'a, str>)> = attrs
            .map(|(attr, value)| {
                let replaced = if is_plain_src(attr) { rewrite(value) } else { None };
                (attr, replaced.map_or(Cow::Borrowed(value), Cow::Owned))
            })
            .collect();
        self.inner
            .start_elem(name, attrs.iter().map(|(attr, value)| (*attr, value.as_ref())))
    }

    fn end_elem(&mut self, name: QualName) -> io::Result<()> {
        self.inner.end_elem(name)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_text(text)
    }

    fn write_comment(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_comment(text)
    }

    fn write_doctype(&mut self, name: &str) -> io::Result<()> {
        self.inner.write_doctype(name)
    }

    fn write_processing_instruction(&mut self, target: &str, data: &str) -> io::Result<()> {
        self.inner.write_processing_instruction(target, data)
    }
}

/// Serialize the children of `parent` exactly as `ElementRef::inner_html`
/// does, except that every `<img>` `src` is passed to `rewrite_img`, which
/// may return a replacement.
pub(crate) fn inner_html<F>(parent: ElementRef<'_>, rewrite_img: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut buf = Vec::new();
    {
        let opts = SerializeOpts {
            scripting_enabled: false,
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        let mut ser = ImgSrcRewriter {
            inner: HtmlSerializer::new(&mut buf, opts),
            rewrite: rewrite_img,
        };
        if let Err(e) = Serialize::serialize(&parent, &mut ser, TraversalScope::ChildrenOnly(None)) {
            log::warn!("Body serialization stopped early: {}", e);
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

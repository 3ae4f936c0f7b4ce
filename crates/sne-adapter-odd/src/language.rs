//! Language-aware selection of `desc` and `gloss` text

use sne_xml::XmlNode;

/// Fallback language when the preferred one is absent
pub const FALLBACK_LANGUAGE: &str = "en";

/// Normalized text of the direct `local_name` child best matching `language`:
/// an exact language match, else an English child, else the first one.
pub fn select(node: &XmlNode, local_name: &str, language: &str) -> Option<String> {
    let candidates = node.find_children(local_name);

    candidates
        .iter()
        .find(|c| language_of(c) == language)
        .or_else(|| candidates.iter().find(|c| language_of(c) == FALLBACK_LANGUAGE))
        .or_else(|| candidates.first())
        .map(|c| c.normalized_text())
}

/// `"gloss: desc"` when both exist, else whichever does, else empty
pub fn documentation(node: &XmlNode, language: &str) -> String {
    let gloss = select(node, "gloss", language).filter(|g| !g.is_empty());
    let desc = select(node, "desc", language).filter(|d| !d.is_empty());

    match (gloss, desc) {
        (Some(gloss), Some(desc)) => format!("{gloss}: {desc}"),
        (Some(text), None) | (None, Some(text)) => text,
        (None, None) => String::new(),
    }
}

fn language_of(node: &XmlNode) -> &str {
    node.attribute("xml:lang")
        .or_else(|| node.attribute("lang"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sne_xml::parse_document;

    fn spec(body: &str) -> XmlNode {
        parse_document(&format!(
            r#"<elementSpec xmlns="http://www.tei-c.org/ns/1.0" ident="p">{body}</elementSpec>"#
        ))
        .unwrap()
        .root
    }

    #[test]
    fn test_preferred_language_wins() {
        let node = spec(
            r#"<desc xml:lang="en">paragraph</desc><desc xml:lang="de">Absatz</desc><desc>plain</desc>"#,
        );
        assert_eq!(select(&node, "desc", "de").as_deref(), Some("Absatz"));
    }

    #[test]
    fn test_english_then_first_fallback() {
        let node = spec(r#"<desc xml:lang="fr">alinéa</desc><desc xml:lang="en">paragraph</desc>"#);
        assert_eq!(select(&node, "desc", "de").as_deref(), Some("paragraph"));

        let node = spec(r#"<desc xml:lang="fr">alinéa</desc><desc xml:lang="it">paragrafo</desc>"#);
        assert_eq!(select(&node, "desc", "de").as_deref(), Some("alinéa"));
    }

    #[test]
    fn test_only_direct_children_count() {
        let node = spec(r#"<attList><attDef ident="n"><desc xml:lang="de">Nummer</desc></attDef></attList>"#);
        assert_eq!(select(&node, "desc", "de"), None);
    }

    #[test]
    fn test_documentation_composition() {
        let node = spec(r#"<gloss>paragraph</gloss><desc>marks   paragraphs</desc>"#);
        assert_eq!(documentation(&node, "de"), "paragraph: marks paragraphs");

        let node = spec(r#"<gloss lang="de">Absatz</gloss>"#);
        assert_eq!(documentation(&node, "de"), "Absatz");

        assert_eq!(documentation(&spec(""), "de"), "");
    }
}

//! Locator resolution against a [`SimDocument`].

use std::collections::HashSet;

use super::css::CssSelector;
use super::dom::{NodeId, SimDocument};
use crate::driver::ElementHandle;
use crate::locator::{text_matches, Filter, Locator, Scope, Selector};
use crate::result::{ProbeError, ProbeResult};

/// Resolve a locator to attached nodes in document order
pub(crate) fn resolve(doc: &SimDocument, locator: &Locator) -> ProbeResult<Vec<NodeId>> {
    let candidates = match locator.scope() {
        None => doc.descendants(doc.root()),
        Some(Scope::Within(parent)) => {
            let mut seen = HashSet::new();
            resolve(doc, parent)?
                .into_iter()
                .flat_map(|p| doc.descendants(p))
                .filter(|n| seen.insert(*n))
                .collect()
        }
        Some(Scope::Frame(owner)) => resolve(doc, owner)?
            .into_iter()
            .filter(|&f| doc.element(f).is_some_and(|e| e.tag() == "iframe"))
            .flat_map(|f| doc.descendants(f))
            .collect(),
    };

    let matcher = SelectorMatcher::new(locator.selector())?;
    let mut matched: Vec<NodeId> = candidates
        .into_iter()
        .filter(|&n| doc.is_attached(n) && matcher.matches(doc, n))
        .collect();

    for filter in locator.filters() {
        match filter {
            Filter::HasText(text) => matched.retain(|&n| text_matches(text, &doc.full_text(n), false)),
            Filter::HasNotText(text) => {
                matched.retain(|&n| !text_matches(text, &doc.full_text(n), false));
            }
            Filter::HasTextMatching(pattern) => {
                let re = regex::Regex::new(pattern).map_err(|err| {
                    ProbeError::driver(format!("invalid has_text pattern {pattern:?}: {err}"))
                })?;
                matched.retain(|&n| re.is_match(&doc.full_text(n)));
            }
        }
    }

    Ok(match locator.nth_pick() {
        Some(nth) => nth.pick(matched),
        None => matched,
    })
}

enum SelectorMatcher<'a> {
    Css(CssSelector),
    Other(&'a Selector),
}

impl<'a> SelectorMatcher<'a> {
    fn new(selector: &'a Selector) -> ProbeResult<Self> {
        Ok(match selector {
            Selector::Css { selector } => Self::Css(CssSelector::parse(selector)?),
            other => Self::Other(other),
        })
    }

    fn matches(&self, doc: &SimDocument, node: NodeId) -> bool {
        let selector = match self {
            Self::Css(css) => return css.matches(doc, node),
            Self::Other(selector) => *selector,
        };
        match selector {
            Selector::Role { role, name, exact } => {
                doc.role(node).as_deref() == Some(role.as_str())
                    && name
                        .as_deref()
                        .map_or(true, |name| text_matches(name, &doc.accessible_name(node), *exact))
            }
            Selector::Label { text, exact } => {
                let is_control = doc.element(node).is_some_and(|e| {
                    matches!(e.tag(), "input" | "select" | "textarea") || e.attribute("aria-label").is_some()
                });
                is_control
                    && (doc
                        .attr(node, "aria-label")
                        .is_some_and(|label| text_matches(text, &label, *exact))
                        || doc
                            .labels_of(node)
                            .into_iter()
                            .any(|l| text_matches(text, &doc.full_text(l), *exact)))
            }
            Selector::Placeholder { text, exact } => doc
                .attr(node, "placeholder")
                .is_some_and(|p| text_matches(text, &p, *exact)),
            Selector::Title { text, exact } => doc
                .attr(node, "title")
                .is_some_and(|t| text_matches(text, &t, *exact)),
            Selector::Text { text, exact } => {
                let own = doc.own_text(node);
                !own.trim().is_empty() && text_matches(text, &own, *exact)
            }
            Selector::Css { .. } => false,
        }
    }
}

/// Node reference encoding: `<generation>:<node>`
pub(crate) fn node_ref(generation: u64, node: NodeId) -> String {
    format!("{generation}:{node}")
}

/// Decode a node reference issued for `generation`
pub(crate) fn parse_ref(node_ref: &str, generation: u64) -> Option<NodeId> {
    let (issued, node) = node_ref.split_once(':')?;
    (issued.parse::<u64>().ok()? == generation)
        .then(|| node.parse().ok())
        .flatten()
}

/// Snapshot a node for the page layer
pub(crate) fn snapshot(doc: &SimDocument, node: NodeId, generation: u64) -> ElementHandle {
    let Some(element) = doc.element(node) else {
        return ElementHandle::default();
    };
    // labels report the state of the control they activate
    let control = doc.labelled_control(node).unwrap_or(node);
    let enabled = !doc.is_disabled(control) && !doc.is_disabled(node);
    let editable = enabled && element.is_text_control() && !element.readonly;
    let value = match element.tag() {
        "input" | "textarea" | "select" => Some(doc.value(node)),
        _ => None,
    };
    let mut attributes = element.attrs.clone();
    if element.disabled {
        attributes.insert("disabled".to_string(), String::new());
    }
    if element.readonly {
        attributes.insert("readonly".to_string(), String::new());
    }
    ElementHandle {
        node_ref: node_ref(generation, node),
        tag: element.tag().to_string(),
        own_text: doc.own_text(node),
        full_text: doc.full_text(node),
        visible: doc.is_visible(node),
        enabled,
        editable,
        checked: doc.is_checked(control),
        value,
        attributes,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sim::dom::SimElement;

    fn practice_form() -> SimDocument {
        let mut doc = SimDocument::new();
        let body = doc.body();
        doc.append(body, SimElement::input("text").id("firstName").placeholder("First Name"));
        doc.append(body, SimElement::input("text").id("lastName").placeholder("Last Name"));
        for (i, gender) in ["Male", "Female", "Other"].iter().enumerate() {
            let id = format!("gender-radio-{}", i + 1);
            doc.append(body, SimElement::input("radio").id(&id).attr("name", "gender"));
            doc.append(body, SimElement::new("label").label_for(&id).text(gender));
        }
        doc.append(body, SimElement::new("button").id("submit").text("Submit"));
        doc
    }

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_placeholder_substring_and_exact() {
            let doc = practice_form();
            assert_eq!(resolve(&doc, &Locator::placeholder("name")).unwrap().len(), 2);
            assert_eq!(resolve(&doc, &Locator::placeholder("First Name").exact()).unwrap().len(), 1);
        }

        #[test]
        fn test_text_exact_disambiguates() {
            let doc = practice_form();
            assert_eq!(resolve(&doc, &Locator::text("Male")).unwrap().len(), 2);
            assert_eq!(resolve(&doc, &Locator::text("Male").exact()).unwrap().len(), 1);
        }

        #[test]
        fn test_label_resolves_control() {
            let doc = practice_form();
            let nodes = resolve(&doc, &Locator::label("Female").exact()).unwrap();
            assert_eq!(nodes.len(), 1);
            assert_eq!(doc.attr(nodes[0], "id").as_deref(), Some("gender-radio-2"));
        }

        #[test]
        fn test_role_with_name() {
            let doc = practice_form();
            assert_eq!(resolve(&doc, &Locator::role("button").name("submit")).unwrap().len(), 1);
            assert_eq!(resolve(&doc, &Locator::role("button").name("submit").exact()).unwrap().len(), 0);
            assert_eq!(resolve(&doc, &Locator::role("radio")).unwrap().len(), 3);
        }

        #[test]
        fn test_invalid_css_is_driver_error() {
            let doc = practice_form();
            assert!(matches!(
                resolve(&doc, &Locator::css("input:nth-child(2)")),
                Err(ProbeError::Driver { .. })
            ));
        }
    }

    mod refinement_tests {
        use super::*;

        #[test]
        fn test_scope_filters_and_nth() {
            let mut doc = SimDocument::new();
            let table = doc.append(doc.body(), SimElement::new("table"));
            for name in ["Cierra", "Alden", "Kierra"] {
                let row = doc.append(table, SimElement::new("tr"));
                doc.append(row, SimElement::new("td").text(name));
                doc.append(row, SimElement::new("span").title("Delete Record"));
            }
            let rows = Locator::role("row");
            assert_eq!(resolve(&doc, &rows.clone().has_text("ierra")).unwrap().len(), 2);
            assert_eq!(resolve(&doc, &rows.clone().has_not_text("ierra")).unwrap().len(), 1);
            assert_eq!(resolve(&doc, &rows.clone().has_text_matching("^K")).unwrap().len(), 1);
            let delete = rows.has_text("Alden").locator(Locator::title("Delete"));
            assert_eq!(resolve(&doc, &delete).unwrap().len(), 1);
            assert_eq!(resolve(&doc, &Locator::css("td").last()).unwrap().len(), 1);
        }

        #[test]
        fn test_frame_scope() {
            let mut doc = SimDocument::new();
            let frame = doc.append(doc.body(), SimElement::iframe("frame1"));
            let inner = doc.frame_body(frame);
            doc.append(inner, SimElement::new("h1").id("sampleHeading").text("This is a sample page"));
            assert!(resolve(&doc, &Locator::css("#sampleHeading")).unwrap().is_empty());
            let heading = Locator::frame("#frame1").css("#sampleHeading");
            assert_eq!(resolve(&doc, &heading).unwrap().len(), 1);
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_label_reports_control_state() {
            let mut doc = practice_form();
            let radio = doc.find("gender-radio-3").unwrap();
            doc.set_checked(radio, true);
            let label = resolve(&doc, &Locator::text("Other")).unwrap()[0];
            let handle = snapshot(&doc, label, 7);
            assert!(handle.checked);
            assert_eq!(handle.value, None);
            assert_eq!(parse_ref(&handle.node_ref, 7), Some(label));
            assert_eq!(parse_ref(&handle.node_ref, 8), None);
        }

        #[test]
        fn test_editable_flags() {
            let mut doc = SimDocument::new();
            let body = doc.body();
            let locked = doc.append(body, SimElement::input("text").readonly());
            let off = doc.append(body, SimElement::input("text").disabled());
            let boxed = doc.append(body, SimElement::input("checkbox"));
            assert!(!snapshot(&doc, locked, 1).editable);
            let disabled = snapshot(&doc, off, 1);
            assert!(!disabled.enabled && !disabled.editable);
            assert!(disabled.attribute("disabled").is_some());
            assert!(!snapshot(&doc, boxed, 1).editable);
        }
    }
}

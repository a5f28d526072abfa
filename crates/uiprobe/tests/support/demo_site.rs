//! In-memory rendition of the demoqa practice site.
//!
//! Every page the scenario catalogue visits is rebuilt with the ids, texts
//! and behaviors the page objects rely on. Timers run on the tokio clock, so
//! tests pause it and the five second alert fires without real waiting.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use uiprobe::pages::elements::{result_token, CHECKBOX_TREE};
use uiprobe::pages::forms::{DATE_INPUT_FORMAT, DATE_SUMMARY_FORMAT};
use uiprobe::pages::widgets::{day_label, MAIN_ITEMS, PICKER_INPUT_FORMAT, SUB_ITEMS, SUB_SUB_ITEMS};
use uiprobe::sim::{NodeId, SimContext, SimDocument, SimElement, SimEvent, SimEventKind, SimSite};
use uiprobe::Dialog;

type Ctx<'a> = SimContext<'a>;

/// Sidebar groups, their entries and the paths the entries open
pub const SECTIONS: [(&str, &[(&str, &str)]); 5] = [
    (
        "Elements",
        &[
            ("Text Box", "/text-box"),
            ("Check Box", "/checkbox"),
            ("Radio Button", "/radio-button"),
            ("Web Tables", "/webtables"),
        ],
    ),
    ("Forms", &[("Practice Form", "/automation-practice-form")]),
    (
        "Alerts, Frame & Windows",
        &[
            ("Browser Windows", "/browser-windows"),
            ("Alerts", "/alerts"),
            ("Frames", "/frames"),
            ("Nested Frames", "/nestedframes"),
            ("Modal Dialogs", "/modal-dialogs"),
        ],
    ),
    (
        "Widgets",
        &[
            ("Accordian", "/accordian"),
            ("Auto Complete", "/auto-complete"),
            ("Date Picker", "/date-picker"),
            ("Slider", "/slider"),
            ("Progress Bar", "/progress-bar"),
            ("Tabs", "/tabs"),
            ("Tool Tips", "/tool-tips"),
            ("Menu", "/menu"),
            ("Select Menu", "/select-menu"),
        ],
    ),
    (
        "Interactions",
        &[
            ("Sortable", "/sortable"),
            ("Selectable", "/selectable"),
            ("Resizable", "/resizable"),
        ],
    ),
];

/// Every route of the practice site
pub fn demo_site() -> SimSite {
    SimSite::new()
        .route("/elements", |doc: &mut SimDocument| {
            section(doc, "Elements");
        })
        .route("/text-box", text_box)
        .route("/checkbox", check_box)
        .route("/radio-button", radio_button)
        .route("/webtables", web_tables)
        .route("/automation-practice-form", practice_form)
        .route("/browser-windows", browser_windows)
        .route("/sample", sample)
        .route("/message-window", message_window)
        .route("/alerts", alerts)
        .route("/frames", frames)
        .route("/nestedframes", nested_frames)
        .route("/modal-dialogs", modal_dialogs)
        .route("/accordian", accordion)
        .route("/auto-complete", auto_complete)
        .route("/date-picker", date_picker)
        .route("/slider", slider)
        .route("/progress-bar", progress_bar)
        .route("/tabs", tabs)
        .route("/tool-tips", tool_tips)
        .route("/menu", menu)
        .route("/select-menu", select_menu)
        .route("/sortable", sortable)
        .route("/selectable", selectable)
        .route("/resizable", resizable)
}

fn is_key(event: &SimEvent, key: &str) -> bool {
    matches!(event, SimEvent::Key(pressed) if pressed == key)
}

// ============================================================================
// Layout shared by section pages
// ============================================================================

/// Sidebar with `open_group` expanded; returns the main content node
fn section(doc: &mut SimDocument, open_group: &str) -> NodeId {
    let body = doc.body();
    let panel = doc.append(body, SimElement::new("div").class("left-pannel"));
    for (group, items) in SECTIONS {
        let wrapper = doc.append(panel, SimElement::new("div").class("element-group"));
        let header = doc.append(wrapper, SimElement::new("div").class("group-header").text(group));
        let mut list = SimElement::new("ul").class("menu-list");
        if group != open_group {
            list = list.hidden();
        }
        let list = doc.append(wrapper, list);
        for &(item, path) in items {
            let entry = doc.append(list, SimElement::new("li").class("btn").text(item));
            doc.on_click(entry, move |ctx: &mut Ctx<'_>| ctx.navigate(path));
        }
        doc.on_click(header, move |ctx: &mut Ctx<'_>| {
            let collapsed = ctx.doc().is_hidden(list);
            ctx.doc().set_hidden(list, !collapsed);
        });
    }
    doc.append(body, SimElement::new("div").class("main"))
}

/// Whether an address looks deliverable.
///
/// Reserved top-level domains (RFC 2606) are refused even when the address
/// is well formed.
pub fn is_valid_email(address: &str) -> bool {
    const RESERVED: [&str; 4] = ["test", "example", "invalid", "localhost"];
    let Ok(shape) = Regex::new(r"^[A-Za-z0-9._%+-]+@([A-Za-z0-9-]+\.)+[A-Za-z]{2,}$") else {
        return false;
    };
    shape.is_match(address)
        && address
            .rsplit('.')
            .next()
            .is_some_and(|tld| !RESERVED.contains(&tld.to_ascii_lowercase().as_str()))
}

// ============================================================================
// Elements
// ============================================================================

fn text_box(doc: &mut SimDocument) {
    let main = section(doc, "Elements");
    let full_name = doc.append(main, SimElement::input("text").id("userName").placeholder("Full Name"));
    let email = doc.append(
        main,
        SimElement::input("email")
            .id("userEmail")
            .class("mr-sm-2")
            .class("form-control")
            .placeholder("name@example.com"),
    );
    let current = doc.append(
        main,
        SimElement::new("textarea").id("currentAddress").placeholder("Current Address"),
    );
    let permanent = doc.append(main, SimElement::new("textarea").id("permanentAddress"));
    let submit = doc.append(main, SimElement::new("button").id("submit").text("Submit"));
    let output = doc.append(main, SimElement::new("div").id("output").hidden());

    doc.on_click(submit, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        let address = doc.value(email);
        if !address.is_empty() && !is_valid_email(&address) {
            // the marker stays until the page reloads
            doc.add_class(email, "field-error");
            return;
        }
        doc.clear(output);
        for (id, label, field) in [
            ("name", "Name", full_name),
            ("email", "Email", email),
            ("currentAddress", "Current Address", current),
            ("permanentAddress", "Permananet Address", permanent),
        ] {
            let value = doc.value(field);
            if !value.is_empty() {
                doc.append(output, SimElement::new("p").id(id).text(&format!("{label}:{value}")));
            }
        }
        doc.set_hidden(output, false);
    });
}

#[derive(Debug, Clone, Copy)]
struct TreeEntry {
    name: &'static str,
    checkbox: NodeId,
    icon: NodeId,
    toggle: Option<NodeId>,
    children: Option<NodeId>,
}

fn tree_children(name: &str) -> &'static [&'static str] {
    CHECKBOX_TREE
        .iter()
        .find(|node| node.name == name)
        .map_or(&[][..], |node| node.children)
}

fn tree_node(doc: &mut SimDocument, list: NodeId, name: &'static str, entries: &mut Vec<TreeEntry>) {
    let children = tree_children(name);
    let item = doc.append(list, SimElement::new("li").class("rct-node"));
    let row = doc.append(item, SimElement::new("span").class("rct-text"));
    let toggle = (!children.is_empty()).then(|| {
        doc.append(
            row,
            SimElement::new("button")
                .class("rct-collapse")
                .aria_label("Toggle")
                .title("Toggle"),
        )
    });
    let id = format!("tree-node-{}", result_token(name).to_lowercase());
    let label = doc.append(row, SimElement::new("label").label_for(&id));
    let checkbox = doc.append(label, SimElement::input("checkbox").id(&id).hidden());
    let icon = doc.append(label, SimElement::new("span").class("rct-checkbox").role("img"));
    doc.append(label, SimElement::new("span").class("rct-title").text(name));
    let nested = (!children.is_empty()).then(|| doc.append(item, SimElement::new("ol").hidden()));
    entries.push(TreeEntry {
        name,
        checkbox,
        icon,
        toggle,
        children: nested,
    });
    if let Some(nested) = nested {
        for &child in children {
            tree_node(doc, nested, child, entries);
        }
    }
}

fn entry_of<'t>(tree: &'t [TreeEntry], name: &str) -> Option<&'t TreeEntry> {
    tree.iter().find(|entry| entry.name == name)
}

/// Tick or clear `name` with its subtree, then settle every parent
fn apply_check(doc: &mut SimDocument, tree: &[TreeEntry], name: &str, checked: bool) {
    if let Some(entry) = entry_of(tree, name) {
        doc.set_checked(entry.checkbox, checked);
    }
    for child in tree_children(name) {
        apply_check(doc, tree, child, checked);
    }
}

fn settle_parents(doc: &mut SimDocument, tree: &[TreeEntry]) {
    // children come after their parent, so walking backwards settles leaves first
    for node in CHECKBOX_TREE.iter().rev().filter(|n| !n.children.is_empty()) {
        let all = node
            .children
            .iter()
            .all(|c| entry_of(tree, c).is_some_and(|e| doc.is_checked(e.checkbox)));
        if let Some(entry) = entry_of(tree, node.name) {
            doc.set_checked(entry.checkbox, all);
        }
    }
}

fn camel_token(name: &str) -> String {
    let token = result_token(name);
    let mut chars = token.chars();
    chars
        .next()
        .map(|first| first.to_lowercase().chain(chars).collect())
        .unwrap_or_default()
}

fn render_selection(doc: &mut SimDocument, tree: &[TreeEntry], result: NodeId) {
    doc.clear(result);
    let selected: Vec<String> = tree
        .iter()
        .filter(|e| doc.is_checked(e.checkbox))
        .map(|e| camel_token(e.name))
        .collect();
    if selected.is_empty() {
        doc.set_hidden(result, true);
        return;
    }
    doc.append(result, SimElement::new("span").text("You have selected :"));
    for token in selected {
        doc.append(result, SimElement::new("span").class("text-success").text(&token));
    }
    doc.set_hidden(result, false);
}

fn check_box(doc: &mut SimDocument) {
    let main = section(doc, "Elements");
    let expand = doc.append(
        main,
        SimElement::new("button").class("rct-option-expand-all").aria_label("Expand all"),
    );
    let collapse = doc.append(
        main,
        SimElement::new("button").class("rct-option-collapse-all").aria_label("Collapse all"),
    );
    let root = doc.append(main, SimElement::new("ol").class("react-checkbox-tree"));
    let mut entries = Vec::new();
    tree_node(doc, root, "Home", &mut entries);
    let result = doc.append(main, SimElement::new("div").id("result").hidden());
    let tree = std::sync::Arc::new(entries);

    let lists: Vec<NodeId> = tree.iter().filter_map(|e| e.children).collect();
    let shown = lists.clone();
    doc.on_click(expand, move |ctx: &mut Ctx<'_>| {
        for &list in &shown {
            ctx.doc().set_hidden(list, false);
        }
    });
    doc.on_click(collapse, move |ctx: &mut Ctx<'_>| {
        for &list in &lists {
            ctx.doc().set_hidden(list, true);
        }
    });

    for entry in tree.iter().copied() {
        if let (Some(toggle), Some(list)) = (entry.toggle, entry.children) {
            doc.on_click(toggle, move |ctx: &mut Ctx<'_>| {
                let collapsed = ctx.doc().is_hidden(list);
                ctx.doc().set_hidden(list, !collapsed);
            });
        }
        let on_icon = std::sync::Arc::clone(&tree);
        doc.on_click(entry.icon, move |ctx: &mut Ctx<'_>| {
            let doc = ctx.doc();
            let checked = !doc.is_checked(entry.checkbox);
            apply_check(doc, &on_icon, entry.name, checked);
            settle_parents(doc, &on_icon);
            render_selection(doc, &on_icon, result);
        });
        let on_input = std::sync::Arc::clone(&tree);
        doc.on_input(entry.checkbox, move |ctx: &mut Ctx<'_>| {
            let doc = ctx.doc();
            let checked = doc.is_checked(entry.checkbox);
            apply_check(doc, &on_input, entry.name, checked);
            settle_parents(doc, &on_input);
            render_selection(doc, &on_input, result);
        });
    }
}

fn radio_button(doc: &mut SimDocument) {
    let main = section(doc, "Elements");
    doc.append(main, SimElement::new("div").text("Do you like the site?"));
    for (id, label, enabled) in [
        ("yesRadio", "Yes", true),
        ("impressiveRadio", "Impressive", true),
        ("noRadio", "No", false),
    ] {
        let mut input = SimElement::input("radio").id(id).attr("name", "like");
        if !enabled {
            input = input.disabled();
        }
        doc.append(main, input);
        doc.append(main, SimElement::new("label").label_for(id).text(label));
    }
    let result = doc.append(main, SimElement::new("p").class("mt-3").text("You have selected ").hidden());
    let answer = doc.append(result, SimElement::new("span").class("text-success"));

    for (id, label) in [("yesRadio", "Yes"), ("impressiveRadio", "Impressive")] {
        if let Some(input) = doc.find(id) {
            doc.on_input(input, move |ctx: &mut Ctx<'_>| {
                let doc = ctx.doc();
                doc.set_text(answer, label);
                doc.set_hidden(result, false);
            });
        }
    }
}

/// Web table columns, in display order
const TABLE_COLUMNS: [&str; 7] = ["First Name", "Last Name", "Age", "Email", "Salary", "Department", "Action"];

/// Registration form inputs, in column order
const TABLE_FIELDS: [(&str, &str); 6] = [
    ("firstName", "First Name"),
    ("lastName", "Last Name"),
    ("age", "Age"),
    ("userEmail", "name@example.com"),
    ("salary", "Salary"),
    ("department", "Department"),
];

const TABLE_ROWS: [[&str; 6]; 3] = [
    ["Cierra", "Vega", "39", "cierra@example.com", "10000", "Insurance"],
    ["Alden", "Cantrell", "45", "alden@example.com", "12000", "Compliance"],
    ["Kierra", "Gentry", "29", "kierra@example.com", "2000", "Legal"],
];

fn append_table_row(doc: &mut SimDocument, rows: NodeId, cells: &[String]) {
    let row = doc.append(rows, SimElement::new("tr").class("rt-tr-group"));
    for cell in cells {
        doc.append(row, SimElement::new("td").text(cell));
    }
    let actions = doc.append(row, SimElement::new("td"));
    doc.append(actions, SimElement::new("span").title("Edit").class("mr-2"));
    doc.append(actions, SimElement::new("span").title("Delete"));
}

fn filter_rows(doc: &mut SimDocument, rows: NodeId, search: NodeId) {
    let query = doc.value(search).to_lowercase();
    for row in doc.children(rows) {
        let shown = doc.full_text(row).to_lowercase().contains(&query);
        doc.set_hidden(row, !shown);
    }
}

fn web_tables(doc: &mut SimDocument) {
    let main = section(doc, "Elements");
    let add = doc.append(main, SimElement::new("button").id("addNewRecordButton").text("Add"));
    let search = doc.append(main, SimElement::input("text").id("searchBox").placeholder("Type to search"));
    let table = doc.append(main, SimElement::new("table").class("rt-table"));
    let head = doc.append(table, SimElement::new("thead"));
    let header = doc.append(head, SimElement::new("tr"));
    for column in TABLE_COLUMNS {
        doc.append(header, SimElement::new("th").text(column));
    }
    let rows = doc.append(table, SimElement::new("tbody"));
    for record in TABLE_ROWS {
        let cells: Vec<String> = record.iter().map(ToString::to_string).collect();
        append_table_row(doc, rows, &cells);
    }

    let form = doc.append(main, SimElement::new("div").id("registration-form-modal").hidden());
    let inputs = TABLE_FIELDS.map(|(id, placeholder)| {
        doc.append(form, SimElement::input("text").id(id).placeholder(placeholder))
    });
    let submit = doc.append(form, SimElement::new("button").id("submit").text("Submit"));

    doc.on_click(add, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        doc.remove_attr(form, "data-editing");
        for input in inputs {
            doc.set_value(input, "");
        }
        doc.set_hidden(form, false);
    });

    doc.on_click(rows, move |ctx: &mut Ctx<'_>| {
        let target = ctx.target();
        let doc = ctx.doc();
        let Some(row) = doc.parent(target).and_then(|cell| doc.parent(cell)) else {
            return;
        };
        match doc.attr(target, "title").as_deref() {
            Some("Edit") => {
                let cells = doc.children(row);
                for (input, cell) in inputs.iter().zip(cells) {
                    let text = doc.own_text(cell);
                    doc.set_value(*input, &text);
                }
                doc.set_attr(form, "data-editing", &row.to_string());
                doc.set_hidden(form, false);
            }
            Some("Delete") => doc.remove(row),
            _ => {}
        }
    });

    doc.on_click(submit, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        let values: Vec<String> = inputs.iter().map(|&input| doc.value(input)).collect();
        let mut complete = true;
        for (&input, value) in inputs.iter().zip(&values) {
            if value.trim().is_empty() {
                doc.add_class(input, "field-error");
                complete = false;
            }
        }
        if !complete {
            return;
        }
        let editing = doc
            .attr(form, "data-editing")
            .and_then(|row| row.parse::<NodeId>().ok())
            .filter(|&row| doc.is_attached(row));
        match editing {
            Some(row) => {
                for (cell, value) in doc.children(row).into_iter().zip(&values) {
                    doc.set_text(cell, value);
                }
            }
            None => append_table_row(doc, rows, &values),
        }
        doc.remove_attr(form, "data-editing");
        doc.set_hidden(form, true);
        filter_rows(doc, rows, search);
    });

    doc.on_input(search, move |ctx: &mut Ctx<'_>| filter_rows(ctx.doc(), rows, search));
}

// ============================================================================
// Forms
// ============================================================================

const SUBJECTS: [&str; 14] = [
    "Hindi",
    "English",
    "Maths",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "Commerce",
    "Accounting",
    "Economics",
    "Arts",
    "Social Studies",
    "History",
    "Civics",
];

const STATES: [(&str, &[&str]); 4] = [
    ("NCR", &["Delhi", "Gurgaon", "Noida"]),
    ("Uttar Pradesh", &["Agra", "Lucknow", "Merrut"]),
    ("Haryana", &["Karnal", "Panipat"]),
    ("Rajasthan", &["Jaipur", "Jaiselmer"]),
];

/// First of `options` containing `typed`, ignoring case
fn autocomplete<'o>(options: &[&'o str], typed: &str) -> Option<&'o str> {
    let typed = typed.trim().to_lowercase();
    if typed.is_empty() {
        return None;
    }
    options
        .iter()
        .copied()
        .find(|option| option.to_lowercase().contains(&typed))
}

struct FormNodes {
    first: NodeId,
    last: NodeId,
    email: NodeId,
    genders: [NodeId; 3],
    mobile: NodeId,
    date: NodeId,
    subjects: NodeId,
    hobbies: [NodeId; 3],
    picture: NodeId,
    address: NodeId,
    state: NodeId,
    city: NodeId,
}

fn subject_chips(doc: &SimDocument, container: NodeId) -> Vec<String> {
    doc.select_within(container, ".subjects-auto-complete__multi-value__label")
        .into_iter()
        .map(|chip| doc.own_text(chip))
        .collect()
}

/// Mark invalid fields; returns whether the form may be submitted
fn validate_registration(doc: &mut SimDocument, form: &FormNodes) -> bool {
    let mut valid = true;
    let mobile_ok = {
        let mobile = doc.value(form.mobile);
        mobile.len() == 10 && mobile.chars().all(|c| c.is_ascii_digit())
    };
    let checks = [
        (form.first, !doc.value(form.first).trim().is_empty()),
        (form.last, !doc.value(form.last).trim().is_empty()),
        (form.mobile, mobile_ok),
        (form.email, {
            let email = doc.value(form.email);
            email.is_empty() || is_valid_email(&email)
        }),
    ];
    for (field, ok) in checks {
        if !ok {
            doc.add_class(field, "field-error");
            valid = false;
        }
    }
    if !form.genders.iter().any(|&g| doc.is_checked(g)) {
        for gender in form.genders {
            doc.add_class(gender, "field-error");
        }
        valid = false;
    }
    valid
}

fn registration_summary(doc: &SimDocument, form: &FormNodes) -> Vec<(&'static str, String)> {
    let gender = form
        .genders
        .iter()
        .find(|&&g| doc.is_checked(g))
        .map(|&g| doc.value(g))
        .unwrap_or_default();
    let raw_date = doc.value(form.date);
    let date = NaiveDate::parse_from_str(&raw_date, DATE_INPUT_FORMAT)
        .map(|d| d.format(DATE_SUMMARY_FORMAT).to_string())
        .unwrap_or(raw_date);
    let hobbies: Vec<String> = form
        .hobbies
        .iter()
        .filter(|&&h| doc.is_checked(h))
        .map(|&h| doc.value(h))
        .collect();
    let state = doc.attr(form.state, "data-value").unwrap_or_default();
    let city = doc.attr(form.city, "data-value").unwrap_or_default();
    vec![
        (
            "Student Name",
            format!("{} {}", doc.value(form.first), doc.value(form.last)),
        ),
        ("Student Email", doc.value(form.email)),
        ("Gender", gender),
        ("Mobile", doc.value(form.mobile)),
        ("Date of Birth", date),
        ("Subjects", subject_chips(doc, form.subjects).join(", ")),
        ("Hobbies", hobbies.join(", ")),
        ("Picture", doc.attr(form.picture, "data-files").unwrap_or_default()),
        ("Address", doc.value(form.address)),
        ("State and City", format!("{state} {city}").trim().to_string()),
    ]
}

fn practice_form(doc: &mut SimDocument) {
    let main = section(doc, "Forms");
    let first = doc.append(main, SimElement::input("text").id("firstName").placeholder("First Name"));
    let last = doc.append(main, SimElement::input("text").id("lastName").placeholder("Last Name"));
    let email = doc.append(main, SimElement::input("email").id("userEmail").placeholder("name@example.com"));

    let mut genders = [0; 3];
    for (i, gender) in ["Male", "Female", "Other"].into_iter().enumerate() {
        let id = format!("gender-radio-{}", i + 1);
        genders[i] = doc.append(
            main,
            SimElement::input("radio").id(&id).attr("name", "gender").value(gender),
        );
        doc.append(main, SimElement::new("label").label_for(&id).text(gender));
    }

    let mobile = doc.append(main, SimElement::input("tel").id("userNumber").placeholder("Mobile Number"));
    let date = doc.append(main, SimElement::input("text").id("dateOfBirthInput").value("01 Jan 2000"));

    let subjects = doc.append(
        main,
        SimElement::new("div").class("subjects-auto-complete__value-container"),
    );
    let subjects_input = doc.append(subjects, SimElement::input("text").id("subjectsInput"));

    let mut hobbies = [0; 3];
    for (i, hobby) in ["Sports", "Reading", "Music"].into_iter().enumerate() {
        let id = format!("hobbies-checkbox-{}", i + 1);
        hobbies[i] = doc.append(main, SimElement::input("checkbox").id(&id).value(hobby));
        doc.append(main, SimElement::new("label").label_for(&id).text(hobby));
    }

    let picture = doc.append(main, SimElement::input("file").id("uploadPicture"));
    doc.append(main, SimElement::new("label").label_for("uploadPicture").text("Select picture"));
    let address = doc.append(
        main,
        SimElement::new("textarea").id("currentAddress").placeholder("Current Address"),
    );

    let state_box = doc.append(main, SimElement::new("div").id("state"));
    let state = doc.append(state_box, SimElement::new("div").class("state-value").text("Select State"));
    let state_input = doc.append(state_box, SimElement::input("text").id("react-select-3-input"));
    let city_box = doc.append(main, SimElement::new("div").id("city"));
    let city = doc.append(city_box, SimElement::new("div").class("city-value").text("Select City"));
    let city_input = doc.append(city_box, SimElement::input("text").id("react-select-4-input").disabled());

    let submit = doc.append(main, SimElement::new("button").id("submit").text("Submit"));

    let body = doc.body();
    let modal = doc.append(body, SimElement::new("div").class("modal-content").hidden());
    doc.append(
        modal,
        SimElement::new("div")
            .id("example-modal-sizes-title-lg")
            .text("Thanks for submitting the form"),
    );
    let table = doc.append(modal, SimElement::new("table"));
    let summary = doc.append(table, SimElement::new("tbody"));
    let close = doc.append(modal, SimElement::new("button").id("closeLargeModal").text("Close"));

    doc.on(date, SimEventKind::Key, move |ctx: &mut Ctx<'_>| {
        if !is_key(ctx.event(), "Enter") {
            return;
        }
        let doc = ctx.doc();
        if let Ok(parsed) = NaiveDate::parse_from_str(doc.value(date).trim(), DATE_INPUT_FORMAT) {
            doc.set_value(date, &parsed.format(DATE_INPUT_FORMAT).to_string());
        }
    });

    doc.on(subjects_input, SimEventKind::Key, move |ctx: &mut Ctx<'_>| {
        if !is_key(ctx.event(), "Enter") {
            return;
        }
        let doc = ctx.doc();
        let typed = doc.value(subjects_input);
        let Some(subject) = autocomplete(&SUBJECTS, &typed) else {
            return;
        };
        if !subject_chips(doc, subjects).iter().any(|chosen| chosen == subject) {
            let chip = doc.append(
                subjects,
                SimElement::new("div").class("subjects-auto-complete__multi-value"),
            );
            doc.append(
                chip,
                SimElement::new("div")
                    .class("subjects-auto-complete__multi-value__label")
                    .text(subject),
            );
        }
        doc.set_value(subjects_input, "");
    });

    doc.on(state_input, SimEventKind::Key, move |ctx: &mut Ctx<'_>| {
        if !is_key(ctx.event(), "Enter") {
            return;
        }
        let doc = ctx.doc();
        let names: Vec<&str> = STATES.iter().map(|(name, _)| *name).collect();
        let Some(chosen) = autocomplete(&names, &doc.value(state_input)) else {
            return;
        };
        doc.set_text(state, chosen);
        doc.set_attr(state, "data-value", chosen);
        doc.set_value(state_input, "");
        doc.set_text(city, "Select City");
        doc.remove_attr(city, "data-value");
        doc.set_disabled(city_input, false);
    });

    doc.on(city_input, SimEventKind::Key, move |ctx: &mut Ctx<'_>| {
        if !is_key(ctx.event(), "Enter") {
            return;
        }
        let doc = ctx.doc();
        let Some(state_name) = doc.attr(state, "data-value") else {
            return;
        };
        let cities = STATES
            .iter()
            .find(|(name, _)| *name == state_name)
            .map_or(&[][..], |(_, cities)| *cities);
        let Some(chosen) = autocomplete(cities, &doc.value(city_input)) else {
            return;
        };
        doc.set_text(city, chosen);
        doc.set_attr(city, "data-value", chosen);
        doc.set_value(city_input, "");
    });

    let nodes = FormNodes {
        first,
        last,
        email,
        genders,
        mobile,
        date,
        subjects,
        hobbies,
        picture,
        address,
        state,
        city,
    };
    doc.on_click(submit, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        if !validate_registration(doc, &nodes) {
            return;
        }
        doc.clear(summary);
        for (label, value) in registration_summary(doc, &nodes) {
            let row = doc.append(summary, SimElement::new("tr"));
            doc.append(row, SimElement::new("td").text(label));
            doc.append(row, SimElement::new("td").text(&value));
        }
        doc.set_hidden(modal, false);
    });

    doc.on_click(close, move |ctx: &mut Ctx<'_>| ctx.doc().set_hidden(modal, true));
}

// ============================================================================
// Alerts, Frame & Windows
// ============================================================================

const SAMPLE_HEADING: &str = "This is a sample page";

fn sample(doc: &mut SimDocument) {
    let body = doc.body();
    doc.append(body, SimElement::new("h1").id("sampleHeading").text(SAMPLE_HEADING));
}

fn message_window(doc: &mut SimDocument) {
    let body = doc.body();
    doc.append(
        body,
        SimElement::new("p").text(
            "Knowledge increases by sharing but not by saving. Please share this website with your friends and in your organization.",
        ),
    );
}

fn browser_windows(doc: &mut SimDocument) {
    let main = section(doc, "Alerts, Frame & Windows");
    for (id, text, target) in [
        ("tabButton", "New Tab", "/sample"),
        ("windowButton", "New Window", "/sample"),
        ("messageWindowButton", "New Window Message", "/message-window"),
    ] {
        let button = doc.append(main, SimElement::new("button").id(id).text(text));
        doc.on_click(button, move |ctx: &mut Ctx<'_>| ctx.open_popup(target));
    }
}

fn alerts(doc: &mut SimDocument) {
    let main = section(doc, "Alerts, Frame & Windows");
    let alert = doc.append(main, SimElement::new("button").id("alertButton").text("Click me"));
    let timer = doc.append(main, SimElement::new("button").id("timerAlertButton").text("Click me"));
    let confirm = doc.append(main, SimElement::new("button").id("confirmButton").text("Click me"));
    let confirm_result = doc.append(main, SimElement::new("span").id("confirmResult").hidden());
    let prompt = doc.append(main, SimElement::new("button").id("promtButton").text("Click me"));
    let prompt_result = doc.append(main, SimElement::new("span").id("promptResult").hidden());

    doc.on_click(alert, |ctx: &mut Ctx<'_>| {
        ctx.raise_dialog(Dialog::alert("You clicked a button"));
    });

    doc.on_click(timer, |ctx: &mut Ctx<'_>| {
        ctx.after(5_000, |ctx: &mut Ctx<'_>| {
            ctx.raise_dialog(Dialog::alert("This alert appeared after 5 seconds"));
        });
    });

    doc.on_click(confirm, move |ctx: &mut Ctx<'_>| {
        let answer = ctx.raise_dialog(Dialog::confirm("Do you confirm action?"));
        let choice = if answer.is_accept() { "OK" } else { "Cancel" };
        let doc = ctx.doc();
        doc.set_text(confirm_result, &format!("You selected {choice}"));
        doc.set_hidden(confirm_result, false);
    });

    doc.on_click(prompt, move |ctx: &mut Ctx<'_>| {
        let dialog = Dialog::prompt("Please enter your name", None);
        let answer = ctx.raise_dialog(dialog.clone());
        let doc = ctx.doc();
        match answer.prompt_text(&dialog).filter(|text| !text.is_empty()) {
            Some(text) => {
                doc.set_text(prompt_result, &format!("You entered {text}"));
                doc.set_hidden(prompt_result, false);
            }
            None => doc.set_hidden(prompt_result, true),
        }
    });
}

fn frames(doc: &mut SimDocument) {
    let main = section(doc, "Alerts, Frame & Windows");
    for (id, width, height) in [("frame1", "500px", "350px"), ("frame2", "100px", "100px")] {
        let frame = doc.append(
            main,
            SimElement::iframe(id)
                .attr("src", "/sample")
                .attr("width", width)
                .attr("height", height),
        );
        let body = doc.frame_body(frame);
        doc.append(body, SimElement::new("h1").id("sampleHeading").text(SAMPLE_HEADING));
    }
}

fn nested_frames(doc: &mut SimDocument) {
    let main = section(doc, "Alerts, Frame & Windows");
    let parent = doc.append(main, SimElement::iframe("frame1").attr("src", "/sampleiframe"));
    let parent_body = doc.frame_body(parent);
    doc.append(parent_body, SimElement::new("p").text("Parent frame"));
    let child = doc.append(parent_body, SimElement::new("iframe").attr("srcdoc", "<p>Child Iframe</p>"));
    let child_body = doc.frame_body(child);
    doc.append(child_body, SimElement::new("p").text("Child Iframe"));
}

fn modal_dialogs(doc: &mut SimDocument) {
    let main = section(doc, "Alerts, Frame & Windows");
    for (open_id, label, close_id, text) in [
        (
            "showSmallModal",
            "Small modal",
            "closeSmallModal",
            "This is a small modal. It has very less content",
        ),
        (
            "showLargeModal",
            "Large modal",
            "closeLargeModal",
            "Lorem Ipsum is simply dummy text of the printing and typesetting industry.",
        ),
    ] {
        let open = doc.append(main, SimElement::new("button").id(open_id).text(label));
        let modal = doc.append(main, SimElement::new("div").class("modal-content").hidden());
        doc.append(modal, SimElement::new("div").class("modal-body").text(text));
        let close = doc.append(modal, SimElement::new("button").id(close_id).text("Close"));
        doc.on_click(open, move |ctx: &mut Ctx<'_>| ctx.doc().set_hidden(modal, false));
        doc.on_click(close, move |ctx: &mut Ctx<'_>| ctx.doc().set_hidden(modal, true));
    }
}

// ============================================================================
// Widgets
// ============================================================================

const ACCORDION: [(&str, &str); 3] = [
    (
        "What is Lorem Ipsum?",
        "Lorem Ipsum is simply dummy text of the printing and typesetting industry.",
    ),
    (
        "Where does it come from?",
        "Contrary to popular belief, Lorem Ipsum is not simply random text.",
    ),
    (
        "Why do we use it?",
        "It is a long established fact that a reader will be distracted by the readable content of a page when looking at its layout.",
    ),
];

fn accordion(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let mut headers = [0; 3];
    let mut bodies = [0; 3];
    for (i, (heading, content)) in ACCORDION.into_iter().enumerate() {
        let card = doc.append(main, SimElement::new("div").class("card"));
        headers[i] = doc.append(
            card,
            SimElement::new("div")
                .id(&format!("section{}Heading", i + 1))
                .class("card-header")
                .text(heading),
        );
        bodies[i] = doc.append(card, SimElement::new("div").class("collapse").hidden());
        let body = doc.append(bodies[i], SimElement::new("div").class("card-body"));
        doc.append(body, SimElement::new("p").text(content));
    }
    for (i, header) in headers.into_iter().enumerate() {
        doc.on_click(header, move |ctx: &mut Ctx<'_>| {
            let doc = ctx.doc();
            let was_open = !doc.is_hidden(bodies[i]);
            for body in bodies {
                doc.set_hidden(body, true);
            }
            doc.set_hidden(bodies[i], was_open);
        });
    }
}

const COLORS: [&str; 11] = [
    "Red", "Blue", "Green", "Yellow", "Purple", "Black", "White", "Voilet", "Indigo", "Magenta", "Aqua",
];

#[derive(Debug, Clone, Copy)]
struct ColorPicker {
    chips: NodeId,
    multiple_input: NodeId,
    indicator: NodeId,
    single_value: NodeId,
    single_input: NodeId,
    menu: NodeId,
}

impl ColorPicker {
    fn chosen(self, doc: &SimDocument) -> Vec<String> {
        doc.select_within(self.chips, ".auto-complete__multi-value__label")
            .into_iter()
            .map(|label| doc.own_text(label))
            .collect()
    }

    /// Rebuild the menu from what `input` holds
    fn suggest(self, doc: &mut SimDocument, input: NodeId, owner: &str) {
        let typed = doc.value(input).trim().to_lowercase();
        let chosen = if owner == "multiple" { self.chosen(doc) } else { Vec::new() };
        doc.clear(self.menu);
        let matches: Vec<&str> = COLORS
            .iter()
            .copied()
            .filter(|color| {
                !typed.is_empty()
                    && color.to_lowercase().contains(&typed)
                    && !chosen.iter().any(|c| c.as_str() == *color)
            })
            .collect();
        for color in &matches {
            doc.append(self.menu, SimElement::new("div").class("auto-complete__option").text(color));
        }
        doc.set_attr(self.menu, "data-owner", owner);
        doc.set_hidden(self.menu, matches.is_empty());
    }

    fn close_menu(self, doc: &mut SimDocument) {
        doc.clear(self.menu);
        doc.set_hidden(self.menu, true);
    }

    fn add_chip(self, doc: &mut SimDocument, color: &str) {
        let chip = doc.append(self.chips, SimElement::new("div").class("auto-complete__multi-value"));
        doc.append(
            chip,
            SimElement::new("div").class("auto-complete__multi-value__label").text(color),
        );
        let remove = doc.append(chip, SimElement::new("div").class("auto-complete__multi-value__remove"));
        doc.append(remove, SimElement::new("svg"));
        doc.set_hidden(self.indicator, false);
    }

    fn remove_chip(self, doc: &mut SimDocument, chip: NodeId) {
        doc.remove(chip);
        if doc.children(self.chips).is_empty() {
            doc.set_hidden(self.indicator, true);
        }
    }
}

fn auto_complete(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let multiple = doc.append(
        main,
        SimElement::new("div")
            .id("autoCompleteMultipleContainer")
            .class("auto-complete__value-container"),
    );
    let chips = doc.append(multiple, SimElement::new("div").class("auto-complete__chips"));
    let multiple_input = doc.append(multiple, SimElement::input("text").id("autoCompleteMultipleInput"));
    let indicator = doc.append(
        multiple,
        SimElement::new("div")
            .class("auto-complete__indicator")
            .class("auto-complete__clear-indicator")
            .hidden(),
    );
    let single = doc.append(main, SimElement::new("div").id("autoCompleteSingleContainer"));
    let single_value = doc.append(single, SimElement::new("div").class("auto-complete__single-value"));
    let single_input = doc.append(single, SimElement::input("text").id("autoCompleteSingleInput"));
    let menu = doc.append(main, SimElement::new("div").class("auto-complete__menu").hidden());

    let picker = ColorPicker {
        chips,
        multiple_input,
        indicator,
        single_value,
        single_input,
        menu,
    };

    doc.on_input(multiple_input, move |ctx: &mut Ctx<'_>| {
        picker.suggest(ctx.doc(), picker.multiple_input, "multiple");
    });
    doc.on_input(single_input, move |ctx: &mut Ctx<'_>| {
        picker.suggest(ctx.doc(), picker.single_input, "single");
    });

    doc.on_click(menu, move |ctx: &mut Ctx<'_>| {
        let target = ctx.target();
        let doc = ctx.doc();
        if target == picker.menu {
            return;
        }
        let color = doc.own_text(target);
        if doc.attr(picker.menu, "data-owner").as_deref() == Some("single") {
            doc.set_text(picker.single_value, &color);
            doc.set_value(picker.single_input, "");
        } else {
            picker.add_chip(doc, &color);
            doc.set_value(picker.multiple_input, "");
        }
        picker.close_menu(doc);
    });

    doc.on_click(multiple, move |ctx: &mut Ctx<'_>| {
        let target = ctx.target();
        let doc = ctx.doc();
        if target == picker.indicator {
            for chip in doc.children(picker.chips) {
                picker.remove_chip(doc, chip);
            }
        } else if doc.element(target).is_some_and(|e| e.tag() == "svg") {
            if let Some(chip) = doc.parent(target).and_then(|remove| doc.parent(remove)) {
                picker.remove_chip(doc, chip);
            }
        }
    });

    doc.on(multiple_input, SimEventKind::Key, move |ctx: &mut Ctx<'_>| {
        if !is_key(ctx.event(), "Backspace") {
            return;
        }
        let doc = ctx.doc();
        if !doc.value(picker.multiple_input).is_empty() {
            return;
        }
        if let Some(&last) = doc.children(picker.chips).last() {
            picker.remove_chip(doc, last);
        }
    });
}

/// Day the simulated calendar opens on
const PICKER_TODAY: (i32, u32, u32) = (2024, 5, 15);

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
    "November", "December",
];

#[derive(Debug, Clone, Copy)]
struct Calendar {
    input: NodeId,
    popup: NodeId,
    current_month: NodeId,
    month_select: NodeId,
    year_select: NodeId,
    days: NodeId,
}

fn choose_option(doc: &mut SimDocument, select: NodeId, value: &str) {
    for option in doc.children(select) {
        let hit = doc.attr(option, "value").as_deref() == Some(value);
        doc.set_checked(option, hit);
    }
}

/// Redraw the shown month from the dropdowns, marking the input's date
fn render_calendar(doc: &mut SimDocument, calendar: Calendar) {
    let month0: u32 = doc.value(calendar.month_select).parse().unwrap_or_default();
    let year: i32 = doc.value(calendar.year_select).parse().unwrap_or(PICKER_TODAY.0);
    let Some(first) = NaiveDate::from_ymd_opt(year, month0 + 1, 1) else {
        return;
    };
    let selected = NaiveDate::parse_from_str(&doc.value(calendar.input), PICKER_INPUT_FORMAT).ok();
    doc.set_text(calendar.current_month, &first.format("%B %Y").to_string());
    doc.clear(calendar.days);

    let mut day = first;
    while day.month0() == month0 {
        let mut cell = SimElement::new("div")
            .class("react-datepicker__day")
            .role("option")
            .aria_label(&day_label(day))
            .text(&day.day().to_string());
        if Some(day) == selected {
            cell = cell.class("react-datepicker__day--selected");
        }
        let cell = doc.append(calendar.days, cell);
        doc.on_click(cell, move |ctx: &mut Ctx<'_>| {
            let doc = ctx.doc();
            doc.set_value(calendar.input, &day.format(PICKER_INPUT_FORMAT).to_string());
            doc.set_hidden(calendar.popup, true);
        });
        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
    }
}

fn show_calendar(doc: &mut SimDocument, calendar: Calendar) {
    doc.set_hidden(calendar.popup, false);
    render_calendar(doc, calendar);
}

fn date_picker(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let today = NaiveDate::from_ymd_opt(PICKER_TODAY.0, PICKER_TODAY.1, PICKER_TODAY.2).unwrap_or_default();
    let input = doc.append(
        main,
        SimElement::input("text")
            .id("datePickerMonthYearInput")
            .value(&today.format(PICKER_INPUT_FORMAT).to_string()),
    );
    let popup = doc.append(main, SimElement::new("div").class("react-datepicker").hidden());
    let container = doc.append(popup, SimElement::new("div").class("react-datepicker__month-container"));
    let header = doc.append(container, SimElement::new("div").class("react-datepicker__header"));
    let current_month = doc.append(header, SimElement::new("div").class("react-datepicker__current-month"));
    let month_select = doc.append(header, SimElement::select().class("react-datepicker__month-select"));
    for (index, name) in MONTHS.iter().enumerate() {
        doc.append(month_select, SimElement::option(&index.to_string(), name));
    }
    let year_select = doc.append(header, SimElement::select().class("react-datepicker__year-select"));
    for year in 1900..=2100 {
        doc.append(year_select, SimElement::option(&year.to_string(), &year.to_string()));
    }
    let days = doc.append(container, SimElement::new("div").class("react-datepicker__month"));

    let calendar = Calendar {
        input,
        popup,
        current_month,
        month_select,
        year_select,
        days,
    };
    choose_option(doc, month_select, &today.month0().to_string());
    choose_option(doc, year_select, &today.year().to_string());
    render_calendar(doc, calendar);

    doc.on_click(input, move |ctx: &mut Ctx<'_>| show_calendar(ctx.doc(), calendar));
    doc.on_input(input, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        let Ok(date) = NaiveDate::parse_from_str(&doc.value(calendar.input), PICKER_INPUT_FORMAT) else {
            return;
        };
        choose_option(doc, calendar.month_select, &date.month0().to_string());
        choose_option(doc, calendar.year_select, &date.year().to_string());
        show_calendar(doc, calendar);
    });
    for select in [month_select, year_select] {
        doc.on_input(select, move |ctx: &mut Ctx<'_>| render_calendar(ctx.doc(), calendar));
    }
}

fn slider(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let range = doc.append(
        main,
        SimElement::input("range")
            .class("range-slider")
            .attr("min", "0")
            .attr("max", "100")
            .value("25"),
    );
    let display = doc.append(main, SimElement::input("text").id("sliderValue").value("25").readonly());
    doc.on_input(range, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        let value = doc.value(range);
        doc.set_value(display, &value);
    });
}

/// Time between progress bar steps of one percent
const PROGRESS_TICK_MS: u64 = 100;

fn set_progress(doc: &mut SimDocument, bar: NodeId, value: u32) {
    doc.set_attr(bar, "aria-valuenow", &value.to_string());
    doc.set_text(bar, &format!("{value}%"));
}

fn progress_of(doc: &SimDocument, bar: NodeId) -> u32 {
    doc.attr(bar, "aria-valuenow")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn progress_bar(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let holder = doc.append(main, SimElement::new("div").id("progressBar"));
    let bar = doc.append(
        holder,
        SimElement::new("div")
            .class("progress-bar")
            .role("progressbar")
            .attr("aria-valuemin", "0")
            .attr("aria-valuemax", "100")
            .attr("aria-valuenow", "0")
            .text("0%"),
    );
    let start = doc.append(main, SimElement::new("button").id("startStopButton").text("Start"));
    let reset = doc.append(main, SimElement::new("button").id("resetButton").text("Reset").hidden());

    doc.on_click(start, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        if doc.own_text(start) == "Stop" {
            doc.set_text(start, "Start");
            return;
        }
        doc.set_text(start, "Stop");
        // a run id retires timers left over from an earlier start
        let run = doc
            .attr(start, "data-run")
            .and_then(|r| r.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        doc.set_attr(start, "data-run", &run.to_string());
        ctx.every(PROGRESS_TICK_MS, move |ctx: &mut Ctx<'_>| {
            let doc = ctx.doc();
            let current = doc.attr(start, "data-run") == Some(run.to_string());
            if !current || doc.own_text(start) != "Stop" {
                return false;
            }
            let value = (progress_of(doc, bar) + 1).min(100);
            set_progress(doc, bar, value);
            if value < 100 {
                return true;
            }
            doc.set_text(start, "Start");
            doc.set_hidden(start, true);
            doc.set_hidden(reset, false);
            false
        });
    });

    doc.on_click(reset, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        set_progress(doc, bar, 0);
        doc.set_hidden(reset, true);
        doc.set_hidden(start, false);
    });
}

const TAB_PANES: [(&str, &str, &str); 3] = [
    (
        "what",
        "What",
        "Lorem Ipsum is simply dummy text of the printing and typesetting industry.",
    ),
    (
        "origin",
        "Origin",
        "Contrary to popular belief, Lorem Ipsum is not simply random text.",
    ),
    (
        "use",
        "Use",
        "It is a long established fact that a reader will be distracted by the readable content of a page.",
    ),
];

/// Tab strip where clicking a tab shows its pane; the first tab starts active
fn tab_strip(doc: &mut SimDocument, parent: NodeId, tabs: &[(&str, &str)]) -> Vec<NodeId> {
    let nav = doc.append(parent, SimElement::new("nav").role("tablist"));
    let mut pairs = Vec::new();
    for (i, &(key, name)) in tabs.iter().enumerate() {
        let active = i == 0;
        let tab = doc.append(
            nav,
            SimElement::new("a")
                .id(&format!("demo-tab-{key}"))
                .role("tab")
                .attr("aria-selected", if active { "true" } else { "false" })
                .text(name),
        );
        let mut pane = SimElement::new("div").id(&format!("demo-tabpane-{key}")).class("tab-pane");
        if !active {
            pane = pane.hidden();
        }
        let pane = doc.append(parent, pane);
        pairs.push((tab, pane));
    }
    let all = std::sync::Arc::new(pairs.clone());
    for &(tab, pane) in &pairs {
        let all = std::sync::Arc::clone(&all);
        doc.on_click(tab, move |ctx: &mut Ctx<'_>| {
            let doc = ctx.doc();
            for &(other_tab, other_pane) in all.iter() {
                doc.set_attr(other_tab, "aria-selected", "false");
                doc.set_hidden(other_pane, true);
            }
            doc.set_attr(tab, "aria-selected", "true");
            doc.set_hidden(pane, false);
        });
    }
    pairs.into_iter().map(|(_, pane)| pane).collect()
}

fn tabs(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let strip: Vec<(&str, &str)> = TAB_PANES.iter().map(|&(key, name, _)| (key, name)).collect();
    let panes = tab_strip(doc, main, &strip);
    for (pane, (_, _, text)) in panes.into_iter().zip(TAB_PANES) {
        doc.append(pane, SimElement::new("p").text(text));
    }
    if let Some(nav) = doc.select_within(main, "nav").first().copied() {
        doc.append(
            nav,
            SimElement::new("a")
                .id("demo-tab-more")
                .role("tab")
                .attr("aria-selected", "false")
                .text("More")
                .disabled(),
        );
    }
}

fn tool_tips(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let button = doc.append(main, SimElement::new("button").id("toolTipButton").text("Hover me to see"));
    let field = doc.append(
        main,
        SimElement::input("text").id("toolTipTextField").placeholder("Hover me to see"),
    );
    let article = doc.append(main, SimElement::new("div").id("texToolTopContainer"));
    let text = doc.append(
        article,
        SimElement::new("p").text("to Lorem Ipsum is not simply random text, it has roots in section"),
    );
    let contrary = doc.append(text, SimElement::new("a").attr("href", "javascript:void(0)").text("Contrary"));
    let section_number = doc.append(text, SimElement::new("a").attr("href", "javascript:void(0)").text("1.10.32"));

    // one tip at a time, on top of the page
    let body = doc.body();
    let mut tips = Vec::new();
    for (target, name) in [
        (button, "Button"),
        (field, "text field"),
        (contrary, "Contrary"),
        (section_number, "1.10.32"),
    ] {
        let tip = doc.append(
            body,
            SimElement::new("div")
                .role("tooltip")
                .class("tooltip-inner")
                .text(&format!("You hovered over the {name}"))
                .hidden(),
        );
        tips.push((target, tip));
    }
    let tips = std::sync::Arc::new(tips);
    for &(target, tip) in tips.iter() {
        let all = std::sync::Arc::clone(&tips);
        doc.on(target, SimEventKind::Hover, move |ctx: &mut Ctx<'_>| {
            let doc = ctx.doc();
            for &(_, other) in all.iter() {
                doc.set_hidden(other, true);
            }
            doc.set_hidden(tip, false);
        });
    }
}

fn menu_link(doc: &mut SimDocument, list: NodeId, text: &str) -> (NodeId, NodeId) {
    let item = doc.append(list, SimElement::new("li"));
    let link = doc.append(item, SimElement::new("a").attr("href", "#").text(text));
    (item, link)
}

fn menu(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");
    let nav = doc.append(main, SimElement::new("ul").id("nav"));
    let mut main_links = Vec::new();
    let mut sub_list = None;
    for (position, name) in MAIN_ITEMS.iter().enumerate() {
        let (item, link) = menu_link(doc, nav, name);
        main_links.push(link);
        if position != 1 {
            continue;
        }
        let subs = doc.append(item, SimElement::new("ul").hidden());
        sub_list = Some(subs);
        for (sub_position, sub_name) in SUB_ITEMS.iter().enumerate() {
            let (sub_item, sub_link) = menu_link(doc, subs, sub_name);
            if sub_position != 2 {
                continue;
            }
            let sub_subs = doc.append(sub_item, SimElement::new("ul").hidden());
            for sub_sub_name in SUB_SUB_ITEMS {
                menu_link(doc, sub_subs, sub_sub_name);
            }
            doc.on(sub_link, SimEventKind::Hover, move |ctx: &mut Ctx<'_>| {
                ctx.doc().set_hidden(sub_subs, false);
            });
        }
    }
    let Some(subs) = sub_list else {
        return;
    };
    for (position, link) in main_links.into_iter().enumerate() {
        doc.on(link, SimEventKind::Hover, move |ctx: &mut Ctx<'_>| {
            ctx.doc().set_hidden(subs, position != 1);
        });
    }
}

const GROUPED_OPTIONS: [(&str, [&str; 2]); 2] = [
    ("Group 1", ["Group 1, option 1", "Group 1, option 2"]),
    ("Group 2", ["Group 2, option 1", "Group 2, option 2"]),
];

const OLD_STYLE_COLORS: [&str; 11] = [
    "Red", "Blue", "Green", "Yellow", "Purple", "Black", "White", "Voilet", "Indigo", "Magenta", "Aqua",
];

const CARS: [(&str, &str); 4] = [("volvo", "Volvo"), ("saab", "Saab"), ("opel", "Opel"), ("audi", "Audi")];

/// Options exist only while the menu is open
fn open_grouped_menu(doc: &mut SimDocument, menu: NodeId, shown: NodeId) {
    for (group, options) in GROUPED_OPTIONS {
        doc.append(menu, SimElement::new("div").class("group-heading").text(group));
        for option in options {
            let node = doc.append(menu, SimElement::new("div").class("option").text(option));
            doc.on_click(node, move |ctx: &mut Ctx<'_>| {
                let doc = ctx.doc();
                doc.set_text(shown, option);
                doc.clear(menu);
                doc.set_hidden(menu, true);
            });
        }
    }
    doc.set_hidden(menu, false);
}

fn select_menu(doc: &mut SimDocument) {
    let main = section(doc, "Widgets");

    let grouped = doc.append(main, SimElement::new("div").id("withOptGroup"));
    let control = doc.append(grouped, SimElement::new("div").class("control"));
    let shown = doc.append(control, SimElement::new("div").class("placeholder").text("Select Option"));
    let menu = doc.append(grouped, SimElement::new("div").class("menu").hidden());
    doc.on_click(control, move |ctx: &mut Ctx<'_>| {
        let doc = ctx.doc();
        if doc.children(menu).is_empty() {
            open_grouped_menu(doc, menu, shown);
        } else {
            doc.clear(menu);
            doc.set_hidden(menu, true);
        }
    });

    let select_one = doc.append(main, SimElement::new("div").id("selectOne"));
    doc.append(select_one, SimElement::new("div").class("placeholder").text("Select Title"));

    let old_style = doc.append(main, SimElement::select().id("oldSelectMenu"));
    for (index, color) in OLD_STYLE_COLORS.iter().enumerate() {
        let option = SimElement::option(&index.to_string(), color);
        doc.append(old_style, if index == 0 { option.checked() } else { option });
    }

    let cars = doc.append(main, SimElement::select().id("cars").attr("multiple", ""));
    for (value, label) in CARS {
        doc.append(cars, SimElement::option(value, label));
    }
}

// ============================================================================
// Interactions
// ============================================================================

const LAYOUTS: [(&str, &str); 2] = [("list", "List"), ("grid", "Grid")];

const COUNTING: [&str; 9] = ["One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine"];

fn item(text: &str) -> SimElement {
    SimElement::new("div")
        .class("list-group-item")
        .class("list-group-item-action")
        .text(text)
}

fn position_in(doc: &SimDocument, container: NodeId, node: NodeId) -> Option<usize> {
    (doc.parent(node) == Some(container))
        .then(|| doc.index_in_parent(node))
        .flatten()
}

fn sortable(doc: &mut SimDocument) {
    let main = section(doc, "Interactions");
    let panes = tab_strip(doc, main, &LAYOUTS);
    for (pane, count) in panes.into_iter().zip([6, 9]) {
        let container = doc.append(pane, SimElement::new("div").class("vertical-list-container"));
        for text in &COUNTING[..count] {
            doc.append(container, item(text));
        }
        doc.on(container, SimEventKind::Drop, move |ctx: &mut Ctx<'_>| {
            let SimEvent::Drop { source } = ctx.event().clone() else {
                return;
            };
            let target = ctx.target();
            let doc = ctx.doc();
            if let (Some(from), Some(to)) = (
                position_in(doc, container, source),
                position_in(doc, container, target),
            ) {
                doc.move_child(container, from, to);
            }
        });
    }
}

fn selectable(doc: &mut SimDocument) {
    let main = section(doc, "Interactions");
    let panes = tab_strip(doc, main, &LAYOUTS);
    let list_items = [
        "Cras justo odio",
        "Dapibus ac facilisis in",
        "Morbi leo risus",
        "Porta ac consectetur ac",
    ];
    for (pane, items) in panes.into_iter().zip([&list_items[..], &COUNTING[..]]) {
        let container = doc.append(pane, SimElement::new("ul"));
        for text in items {
            doc.append(container, item(text));
        }
        doc.on_click(container, move |ctx: &mut Ctx<'_>| {
            let target = ctx.target();
            let doc = ctx.doc();
            if position_in(doc, container, target).is_some() {
                doc.toggle_class(target, "active");
            }
        });
    }
}

/// Viewport position of the restricted box's top-left corner
const BOX_ORIGIN: (f64, f64) = (300.0, 200.0);

fn clamp_px(offset: f64, min: u32, max: u32) -> u32 {
    // clamped to a u32 range first, so the cast cannot truncate
    offset.round().clamp(f64::from(min), f64::from(max)) as u32
}

fn resizable(doc: &mut SimDocument) {
    let main = section(doc, "Interactions");
    let restricted = doc.append(
        main,
        SimElement::new("div")
            .id("resizableBoxWithRestriction")
            .attr("style", "width: 200px; height: 200px;"),
    );
    doc.append(
        restricted,
        SimElement::new("div")
            .class("text")
            .text("Resizable box, starting at 200x200. Min size is 150x150, max is 500x300."),
    );
    let handle = doc.append(
        restricted,
        SimElement::new("span")
            .class("react-resizable-handle")
            .class("react-resizable-handle-se"),
    );

    doc.on(handle, SimEventKind::MouseDown, move |ctx: &mut Ctx<'_>| {
        ctx.doc().set_attr(handle, "data-dragging", "true");
    });
    doc.on(handle, SimEventKind::MouseUp, move |ctx: &mut Ctx<'_>| {
        ctx.doc().remove_attr(handle, "data-dragging");
    });
    doc.on(handle, SimEventKind::MouseMove, move |ctx: &mut Ctx<'_>| {
        let SimEvent::MouseMove { x, y } = ctx.event().clone() else {
            return;
        };
        let doc = ctx.doc();
        if doc.attr(handle, "data-dragging").is_none() {
            return;
        }
        let width = clamp_px(x - BOX_ORIGIN.0, 150, 500);
        let height = clamp_px(y - BOX_ORIGIN.1, 150, 300);
        doc.set_attr(restricted, "style", &format!("width: {width}px; height: {height}px;"));
    });
}

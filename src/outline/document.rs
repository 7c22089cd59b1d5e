use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::iter::Peekable;
use std::path::Path;
use std::sync::LazyLock;
use std::vec::IntoIter;

use anyhow::{Context, Result};
use regex::Regex;

use super::table::{Row, Table};

static RE_DRAWER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*:(?P<name>[A-Za-z_-]+):\s*$").expect("Failed to create regex pattern for drawer"));

static RE_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*:(?P<key>[^:\s]+):\s*(?P<value>.*?)\s*$").expect("Failed to create regex pattern for property")
});

const PROPERTIES_DRAWER: &str = "PROPERTIES";

/// Title of the heading appended when a document has none to hold the category tree.
const DEFAULT_TREE_HEADING: &str = "Categories";

/// A node of the outline tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading {
        level: usize,
        title: String,
        children: Vec<Self>,
    },
    /// `:NAME:` ... `:END:` block, lines stored verbatim.
    Drawer { name: String, lines: Vec<String> },
    Table(Table),
    Text(String),
}

/// Parsed outline document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

/// Flat parse result before headings are nested.
enum Item {
    Heading(usize, String),
    Node(Node),
}

impl Document {
    /// Read and parse a document file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read document: {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Parse document text. Never fails: unrecognised lines are kept as text.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut items = parse_items(content).into_iter().peekable();
        Self {
            nodes: nest(&mut items, 0),
        }
    }

    /// Render the document back to text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        render_nodes(&self.nodes, &mut lines);
        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Write the document to a temporary file next to `path` and move it over the original.
    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(directory)
            .with_context(|| format!("Failed to create temporary file in {}", directory.display()))?;
        file.write_all(self.render().as_bytes())
            .context("Failed to write temporary document")?;
        file.persist(path)
            .with_context(|| format!("Failed to replace document: {}", path.display()))?;
        Ok(())
    }

    /// All nodes in document order matching the predicate, searching inside headings.
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        let mut found = Vec::new();
        collect_nodes(&self.nodes, &predicate, &mut found);
        found
    }

    /// Key-value pairs from all property drawers. Later keys override earlier ones.
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.find_all(|node| matches!(node, Node::Drawer { name, .. } if name.eq_ignore_ascii_case(PROPERTIES_DRAWER)))
            .into_iter()
            .filter_map(|node| match node {
                Node::Drawer { lines, .. } => Some(lines),
                _ => None,
            })
            .flatten()
            .filter_map(|line| {
                let caps = RE_PROPERTY.captures(line)?;
                Some((caps["key"].to_string(), caps["value"].to_string()))
            })
            .collect()
    }

    /// The single table of the document.
    pub fn table_mut(&mut self) -> Result<&mut Table> {
        let mut tables = Vec::new();
        collect_tables(&mut self.nodes, &mut tables);
        match tables.len() {
            0 => anyhow::bail!("Document does not contain a table"),
            1 => Ok(tables.remove(0)),
            count => anyhow::bail!("Document must contain exactly one table, found {count}"),
        }
    }

    /// Replace the contents of the last top-level heading with the given text lines.
    ///
    /// A heading is appended if the document has none,
    /// or if the last heading holds the table.
    pub fn replace_last_heading_body(&mut self, body: Vec<String>) {
        let body: Vec<Node> = body.into_iter().map(Node::Text).collect();
        let last_heading = self
            .nodes
            .iter_mut()
            .rev()
            .find_map(|node| match node {
                Node::Heading { children, .. } => Some(children),
                _ => None,
            });

        match last_heading {
            Some(children) if !contains_table(children) => *children = body,
            _ => self.nodes.push(Node::Heading {
                level: 1,
                title: DEFAULT_TREE_HEADING.to_string(),
                children: body,
            }),
        }
    }
}

fn parse_items(content: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        if let Some((level, title)) = heading(line) {
            items.push(Item::Heading(level, title));
        } else if Table::is_table_line(line) {
            let mut table = Table {
                rows: vec![Row::parse(line)],
            };
            while let Some(next) = lines.next_if(|next| Table::is_table_line(next)) {
                table.rows.push(Row::parse(next));
            }
            items.push(Item::Node(Node::Table(table)));
        } else if let Some(caps) = RE_DRAWER_START.captures(line)
            && !caps["name"].eq_ignore_ascii_case("END")
        {
            let mut drawer_lines = Vec::new();
            let mut closed = false;
            for next in lines.by_ref() {
                if next.trim().eq_ignore_ascii_case(":END:") {
                    closed = true;
                    break;
                }
                drawer_lines.push(next.to_string());
            }
            if closed {
                items.push(Item::Node(Node::Drawer {
                    name: caps["name"].to_string(),
                    lines: drawer_lines,
                }));
            } else {
                items.push(Item::Node(Node::Text(line.to_string())));
                items.extend(drawer_lines.into_iter().map(|text| Item::Node(Node::Text(text))));
            }
        } else {
            items.push(Item::Node(Node::Text(line.to_string())));
        }
    }

    items
}

/// Heading level and title if the line starts with stars followed by a space.
fn heading(line: &str) -> Option<(usize, String)> {
    let level = line.chars().take_while(|&c| c == '*').count();
    if level == 0 {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() {
        return Some((level, String::new()));
    }
    rest.starts_with([' ', '\t']).then(|| (level, rest.trim().to_string()))
}

fn nest(items: &mut Peekable<IntoIter<Item>>, level: usize) -> Vec<Node> {
    let mut nodes = Vec::new();
    while let Some(item) = items.next_if(|item| !matches!(item, Item::Heading(l, _) if *l <= level)) {
        match item {
            Item::Heading(heading_level, title) => {
                let children = nest(items, heading_level);
                nodes.push(Node::Heading {
                    level: heading_level,
                    title,
                    children,
                });
            }
            Item::Node(node) => nodes.push(node),
        }
    }
    nodes
}

fn render_nodes(nodes: &[Node], lines: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Heading { level, title, children } => {
                let stars = "*".repeat(*level);
                if title.is_empty() {
                    lines.push(stars);
                } else {
                    lines.push(format!("{stars} {title}"));
                }
                render_nodes(children, lines);
            }
            Node::Drawer { name, lines: drawer_lines } => {
                lines.push(format!(":{name}:"));
                lines.extend(drawer_lines.iter().cloned());
                lines.push(":END:".to_string());
            }
            Node::Table(table) => lines.extend(table.render()),
            Node::Text(text) => lines.push(text.clone()),
        }
    }
}

fn collect_nodes<'a, F>(nodes: &'a [Node], predicate: &F, found: &mut Vec<&'a Node>)
where
    F: Fn(&Node) -> bool,
{
    for node in nodes {
        if predicate(node) {
            found.push(node);
        }
        if let Node::Heading { children, .. } = node {
            collect_nodes(children, predicate, found);
        }
    }
}

fn contains_table(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Table(_) => true,
        Node::Heading { children, .. } => contains_table(children),
        _ => false,
    })
}

fn collect_tables<'a>(nodes: &'a mut [Node], tables: &mut Vec<&'a mut Table>) {
    for node in nodes {
        match node {
            Node::Table(table) => tables.push(table),
            Node::Heading { children, .. } => collect_tables(children, tables),
            _ => {}
        }
    }
}

#[cfg(test)]
mod document_tests {
    use super::*;

    use tempfile::tempdir;

    const SAMPLE: &str = "\
#+TITLE: Filing
* Settings
:PROPERTIES:
:sourcedir: /data/inbox
:targetdir: /data/archive
:subgroups-per-group: 10
:END:
* Files
| category | action | path |
|----------+--------+------|
| a/b/c    | k      | x    |
** Notes
some text
* Categories
 * 10-19 a
";

    #[test]
    fn parses_headings_and_nesting() {
        let document = Document::parse(SAMPLE);
        assert_eq!(document.nodes.len(), 4);
        assert_eq!(document.nodes[0], Node::Text("#+TITLE: Filing".to_string()));

        let Node::Heading { title, children, .. } = &document.nodes[2] else {
            panic!("expected heading");
        };
        assert_eq!(title, "Files");
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[1], Node::Heading { level: 2, title, .. } if title == "Notes"));
    }

    #[test]
    fn reads_properties() {
        let properties = Document::parse(SAMPLE).properties();
        assert_eq!(properties["sourcedir"], "/data/inbox");
        assert_eq!(properties["targetdir"], "/data/archive");
        assert_eq!(properties["subgroups-per-group"], "10");
    }

    #[test]
    fn finds_the_table() {
        let mut document = Document::parse(SAMPLE);
        let table = document.table_mut().unwrap();
        assert_eq!(table.header_len(), 2);
        assert_eq!(table.data_rows().count(), 1);
    }

    #[test]
    fn table_count_is_checked() {
        assert!(Document::parse("* a\ntext\n").table_mut().is_err());
        assert!(Document::parse("|a|\n\n|b|\n").table_mut().is_err());
    }

    #[test]
    fn find_all_searches_nested_nodes() {
        let document = Document::parse(SAMPLE);
        let texts = document.find_all(|node| matches!(node, Node::Text(_)));
        assert_eq!(texts.len(), 3);
    }

    #[test]
    fn render_round_trips_aligned_document() {
        let document = Document::parse(SAMPLE);
        assert_eq!(document.render(), SAMPLE);
    }

    #[test]
    fn replaces_last_heading_body() {
        let mut document = Document::parse(SAMPLE);
        document.replace_last_heading_body(vec![" * 10-19 x".to_string(), "   * 10 y".to_string()]);
        assert!(document.render().ends_with("* Categories\n * 10-19 x\n   * 10 y\n"));
    }

    #[test]
    fn appends_heading_when_missing() {
        let mut document = Document::parse("|a|b|c|\n");
        document.replace_last_heading_body(vec![" * 10-19 x".to_string()]);
        assert_eq!(document.render(), "| a | b | c |\n* Categories\n * 10-19 x\n");
    }

    #[test]
    fn table_under_last_heading_is_kept() {
        let text = "* Files\n| category | action | path  |\n|----------+--------+-------|\n| a/b/c    | k      | a.txt |\n";
        let mut document = Document::parse(text);
        document.replace_last_heading_body(vec![" * 10-19 a".to_string()]);

        let rendered = document.render();
        assert_eq!(rendered, format!("{text}* Categories\n * 10-19 a\n"));
        assert_eq!(document.table_mut().unwrap().data_rows().count(), 1);

        document.replace_last_heading_body(vec![" * 20-29 b".to_string()]);
        assert_eq!(document.render(), format!("{text}* Categories\n * 20-29 b\n"));
    }

    #[test]
    fn unterminated_drawer_is_text() {
        let document = Document::parse(":PROPERTIES:\n:a: b\n");
        assert!(document.properties().is_empty());
        assert_eq!(document.render(), ":PROPERTIES:\n:a: b\n");
    }

    #[test]
    fn saves_atomically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("files.org");
        fs::write(&path, "old").unwrap();

        Document::parse(SAMPLE).save_atomic(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

use crate::{Descendants, Element, ParseTree};
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

impl ParseTree {
    pub(crate) fn node(
        element: Arc<Element>,
        start: usize,
        end: usize,
        matched: String,
        children: Vec<ParseTree>,
    ) -> Self {
        Self {
            element,
            start,
            end,
            matched,
            children,
        }
    }

    pub(crate) fn leaf(element: Arc<Element>, start: usize, end: usize, matched: String) -> Self {
        ParseTree::node(element, start, end, matched, Vec::new())
    }

    /// A node spanning exactly its single child.
    pub(crate) fn wrap(element: Arc<Element>, child: ParseTree) -> Self {
        let (start, end, matched) = (child.start, child.end, child.matched.clone());
        ParseTree::node(element, start, end, matched, vec![child])
    }

    /// The rule name when this node is a rule reference.
    pub fn rule_name(&self) -> Option<&str> {
        match self.element.as_ref() {
            Element::RuleRef(name) => Some(name),
            _ => None,
        }
    }

    /// This node and every node below it, depth first, parents before children.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// The first node matched by the named rule, in [descendants](ParseTree::descendants)
    /// order. The name is compared ignoring case.
    pub fn find_rule(&self, name: &str) -> Option<&ParseTree> {
        self.descendants().find(|tree| tree.is_rule(name))
    }

    /// Every node matched by the named rule.
    pub fn list_rules(&self, name: &str) -> Vec<&ParseTree> {
        self.descendants().filter(|tree| tree.is_rule(name)).collect()
    }

    pub fn contains_rule(&self, name: &str) -> bool {
        self.find_rule(name).is_some()
    }

    fn is_rule(&self, name: &str) -> bool {
        self.rule_name()
            .map_or(false, |rule| rule.eq_ignore_ascii_case(name))
    }

    fn label(&self) -> String {
        format!("{} # {}-{}", self.element.describe(), self.start, self.end)
    }

    /// Render the tree to standard output.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl<'t> Iterator for Descendants<'t> {
    type Item = &'t ParseTree;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.stack.pop()?;
        self.stack.extend(tree.children.iter().rev());
        Some(tree)
    }
}

impl Display for ParseTree {
    /// An indented outline of the match, one node per line.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn outline(tree: &ParseTree, depth: usize, f: &mut Formatter<'_>) -> std::fmt::Result {
            writeln!(f, "{:indent$}{}", "", tree.label(), indent = depth * 2)?;
            for child in &tree.children {
                outline(child, depth + 1, f)?;
            }
            Ok(())
        }
        outline(self, 0, f)
    }
}

impl Debug for ParseTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())?;
        if self.children.is_empty() {
            write!(f, " {:?}", self.matched)
        } else {
            write!(f, " ")?;
            f.debug_list().entries(self.children.iter()).finish()
        }
    }
}

impl TreeItem for ParseTree {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label())
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}

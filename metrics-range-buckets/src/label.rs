use std::{fmt, slice::Iter, sync::Arc};

/// A single key/value pair attached to a sample.
///
/// Both halves are reference-counted, so cloning a label never copies the underlying strings.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct Label(Arc<str>, Arc<str>);

impl Label {
    /// Creates a [`Label`] from a name and value.
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<Arc<str>>,
        V: Into<Arc<str>>,
    {
        Label(name.into(), value.into())
    }

    /// Name of this label.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Value of this label.
    pub fn value(&self) -> &str {
        &self.1
    }
}

impl<N, V> From<(N, V)> for Label
where
    N: Into<Arc<str>>,
    V: Into<Arc<str>>,
{
    fn from(pair: (N, V)) -> Label {
        Label::new(pair.0, pair.1)
    }
}

/// An immutable set of labels.
///
/// Labels are kept sorted by name, with at most one label per name.  Label sets handed to us by a
/// query engine are frequently shared or interned, so a `LabelSet` can never be changed once
/// built: cloning it shares the same storage, and deriving a modified set goes through
/// [`LabelSetBuilder`], which always allocates fresh storage.
///
/// Following the Prometheus data model, a label with an empty value is equivalent to the label
/// not being present at all, and is dropped on construction.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct LabelSet(Arc<[Label]>);

impl LabelSet {
    /// Creates an empty `LabelSet`.
    pub fn empty() -> Self {
        LabelSet(Vec::new().into())
    }

    /// Creates a `LabelSet` from any collection of labels.
    ///
    /// If the same name is given more than once, the last value wins.
    pub fn from_labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let mut labels = labels.into_iter().map(Into::into).collect::<Vec<Label>>();

        // Stable sort, so that among duplicates the last one given is the last one in its run.
        labels.sort_by(|a, b| a.0.cmp(&b.0));
        let mut deduped: Vec<Label> = Vec::with_capacity(labels.len());
        for label in labels {
            if deduped.last().is_some_and(|last| last.0 == label.0) {
                deduped.pop();
            }
            deduped.push(label);
        }
        deduped.retain(|label| !label.1.is_empty());

        LabelSet(deduped.into())
    }

    /// Gets the value of the label with the given name, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .binary_search_by(|label| label.name().cmp(name))
            .ok()
            .map(|idx| self.0[idx].value())
    }

    /// Returns `true` if a label with the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of labels in this set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no labels in this set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the labels in name order.
    pub fn iter(&self) -> Iter<'_, Label> {
        self.0.iter()
    }

    /// Returns `true` if both sets share the same underlying storage.
    pub fn ptr_eq(&self, other: &LabelSet) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        LabelSet::empty()
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<L> FromIterator<L> for LabelSet
where
    L: Into<Label>,
{
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        LabelSet::from_labels(iter)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, label) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}=\"{}\"", label.name(), escape_label_value(label.value()))?;
        }
        f.write_str("}")
    }
}

/// Derives a new [`LabelSet`] from an existing one.
///
/// The source set is only ever read: deletions and updates are staged in the builder and applied
/// when [`build`](LabelSetBuilder::build) produces the new set.
#[derive(Debug, Clone)]
pub struct LabelSetBuilder<'a> {
    base: &'a LabelSet,
    del: Vec<Arc<str>>,
    add: Vec<Label>,
}

impl<'a> LabelSetBuilder<'a> {
    /// Creates a new builder based on the given label set.
    pub fn new(base: &'a LabelSet) -> Self {
        LabelSetBuilder { base, del: Vec::new(), add: Vec::new() }
    }

    /// Removes the label with the given name.
    #[must_use]
    pub fn del<N>(mut self, name: N) -> Self
    where
        N: Into<Arc<str>>,
    {
        let name = name.into();
        self.add.retain(|label| label.0 != name);
        self.del.push(name);
        self
    }

    /// Sets the label with the given name to the given value.
    ///
    /// Setting an empty value removes the label.
    #[must_use]
    pub fn set<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<Arc<str>>,
        V: Into<Arc<str>>,
    {
        let label = Label::new(name, value);
        if label.1.is_empty() {
            return self.del(label.0);
        }
        self.del.retain(|name| *name != label.0);
        self.add.retain(|existing| existing.0 != label.0);
        self.add.push(label);
        self
    }

    /// Builds the resulting label set.
    pub fn build(self) -> LabelSet {
        let LabelSetBuilder { base, del, add } = self;

        let mut labels = base
            .iter()
            .filter(|label| !del.contains(&label.0) && !add.iter().any(|a| a.0 == label.0))
            .cloned()
            .collect::<Vec<_>>();
        labels.extend(add);
        labels.sort_by(|a, b| a.0.cmp(&b.0));

        LabelSet(labels.into())
    }
}

/// Escapes a label value for the Prometheus text exposition format.
pub(crate) fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

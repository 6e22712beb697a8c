/// A blank-line-separated block of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Position in the document, used to restore order after translation.
    pub index: usize,
    pub text: &'a str,
}

/// Splits a document into paragraphs separated by one or more blank lines.
///
/// Lines inside a paragraph keep their original line breaks; surrounding
/// whitespace-only lines are dropped.
pub fn split_fragments(document: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in document.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(begin) = start.take() {
                fragments.push(&document[begin..end]);
            }
        } else {
            start.get_or_insert(offset);
            end = offset + line.trim_end().len();
        }
        offset += line.len();
    }
    if let Some(begin) = start {
        fragments.push(&document[begin..end]);
    }

    fragments
        .into_iter()
        .enumerate()
        .map(|(index, text)| Fragment { index, text })
        .collect()
}

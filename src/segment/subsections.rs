//! Second pass: split a section's text into bullet/phrase-level subsections.

use super::SubSection;

/// Characters that mark a bulleted line.
const BULLET_MARKERS: [char; 4] = ['•', '◦', '▪', '‣'];

#[derive(Debug)]
struct OpenSubSection {
    title: String,
    lines: Vec<String>,
}

impl OpenSubSection {
    /// Emit the subsection unless it is a bare heading (`Tips:`) with nothing under it.
    fn close(self, page: u32) -> Option<SubSection> {
        if self.title.is_empty() {
            return None;
        }
        let dangling_heading = self.lines.len() == 1 && self.lines[0].trim_end().ends_with(':');
        if dangling_heading {
            tracing::trace!(title = %self.title, "Dropping subsection heading without content");
            return None;
        }
        let text = self.lines.join("\n");
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(SubSection {
            title: self.title,
            text: text.to_string(),
            page,
        })
    }
}

#[derive(Debug)]
enum SubSectionState {
    /// No boundary seen yet; lines stay with the parent only.
    Preamble,
    InSubSection(OpenSubSection),
}

/// Whether `line` opens a new subsection. Bare markers (`•`, `:`) carry no title and stay in
/// the current buffer.
pub(crate) fn is_boundary(line: &str) -> bool {
    let marked = line.starts_with(BULLET_MARKERS) || line.trim().ends_with(':');
    marked && !boundary_title(line).is_empty()
}

/// Title for a boundary line: text before the first colon, bullet marker removed.
pub(crate) fn boundary_title(line: &str) -> String {
    let head = match line.split_once(':') {
        Some((head, _)) => head,
        None => line,
    };
    head.trim()
        .trim_start_matches(BULLET_MARKERS)
        .trim()
        .to_string()
}

/// Split `text` into subsections, all placed on the parent's `page`.
pub(crate) fn split_subsections(text: &str, page: u32) -> Vec<SubSection> {
    let mut subsections = Vec::new();
    let mut state = SubSectionState::Preamble;

    for line in text.split('\n') {
        if is_boundary(line) {
            if let SubSectionState::InSubSection(open) = state {
                subsections.extend(open.close(page));
            }
            state = SubSectionState::InSubSection(OpenSubSection {
                title: boundary_title(line),
                lines: vec![line.to_string()],
            });
            continue;
        }
        if let SubSectionState::InSubSection(open) = &mut state {
            open.lines.push(line.to_string());
        }
    }

    if let SubSectionState::InSubSection(open) = state {
        subsections.extend(open.close(page));
    }
    subsections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_with_colon_takes_title_before_colon() {
        let subsections = split_subsections("• Cafe A: great coffee\nvery busy at noon", 4);
        assert_eq!(subsections.len(), 1);
        assert_eq!(subsections[0].title, "Cafe A");
        assert_eq!(subsections[0].text, "• Cafe A: great coffee\nvery busy at noon");
        assert_eq!(subsections[0].page, 4);
    }

    #[test]
    fn colon_terminated_line_opens_subsection() {
        let subsections = split_subsections("intro line\nPacking tips:\nBring layers\nPack light", 1);
        assert_eq!(subsections.len(), 1);
        assert_eq!(subsections[0].title, "Packing tips");
        assert_eq!(subsections[0].text, "Packing tips:\nBring layers\nPack light");
    }

    #[test]
    fn bullet_without_colon_uses_whole_line() {
        let subsections = split_subsections("• Visit the old town\n• Try the market", 2);
        let titles: Vec<_> = subsections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Visit the old town", "Try the market"]);
    }

    #[test]
    fn preamble_lines_are_not_promoted() {
        let subsections = split_subsections("plain\nmore plain", 1);
        assert!(subsections.is_empty());
    }

    #[test]
    fn dangling_heading_is_dropped() {
        let subsections = split_subsections("Tips:\n• Eat early: cheaper menus", 1);
        assert_eq!(subsections.len(), 1);
        assert_eq!(subsections[0].title, "Eat early");
    }

    #[test]
    fn post_boundary_lines_are_kept_in_order() {
        let text = "lead\n• A: one\nx\ny\n• B\nz";
        let subsections = split_subsections(text, 1);
        let rebuilt: Vec<&str> = subsections
            .iter()
            .flat_map(|s| s.text.split('\n'))
            .collect();
        assert_eq!(rebuilt, vec!["• A: one", "x", "y", "• B", "z"]);
    }

    #[test]
    fn bare_markers_stay_in_current_buffer() {
        let text = "• A: one\nx\n•\nCafe B great coffee\nvery busy\n:";
        let subsections = split_subsections(text, 1);
        assert_eq!(subsections.len(), 1);
        let rebuilt: Vec<&str> = subsections
            .iter()
            .flat_map(|s| s.text.split('\n'))
            .collect();
        assert_eq!(
            rebuilt,
            vec!["• A: one", "x", "•", "Cafe B great coffee", "very busy", ":"]
        );
    }

    #[test]
    fn boundary_detection() {
        assert!(is_boundary("• item"));
        assert!(is_boundary("◦ nested"));
        assert!(is_boundary("Heading:  "));
        assert!(!is_boundary("a: b"));
        assert!(!is_boundary("plain"));
        assert!(!is_boundary("•"));
        assert!(!is_boundary(" : "));
    }
}

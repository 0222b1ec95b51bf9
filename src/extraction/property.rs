//! Maps character spans of a schema text onto property paths.

use crate::constants::PROPERTY_SEPARATOR;

use super::types::Property;

/// Char-indexed view of a schema text.
///
/// Offsets produced by the tokenizer are char offsets, so the text is decoded
/// once and every span lookup indexes the same buffer.
#[derive(Debug, Clone)]
pub struct PropertyLocator {
    chars: Vec<char>,
}

impl PropertyLocator {
    pub fn new(context: &str) -> Self {
        Self {
            chars: context.chars().collect(),
        }
    }

    /// Number of chars in the context.
    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Returns the text in `[start_char, end_char)`, clamped to the context.
    pub fn slice(&self, start_char: usize, end_char: usize) -> String {
        let end = end_char.min(self.chars.len());
        if start_char >= end {
            return String::new();
        }
        self.chars[start_char..end].iter().collect()
    }

    /// Identifies every property touched by the span `[start_char, end_char)`.
    ///
    /// A property that begins at `start_char` is extended backward, and a property
    /// still open at `end_char` is extended forward, up to the nearest separator
    /// or text boundary. Extension marks the property as partial.
    pub fn identify_properties(&self, start_char: usize, end_char: usize) -> Vec<Property> {
        let end_char = end_char.min(self.chars.len());
        let mut properties = Vec::new();
        let mut current: Option<Property> = None;

        for index in start_char..end_char {
            let c = self.chars[index];

            if c == PROPERTY_SEPARATOR {
                if let Some(mut property) = current.take() {
                    property.end_char = index;
                    if property.start_char == start_char {
                        self.extend_backward(&mut property, start_char);
                    }
                    properties.push(property);
                }
                continue;
            }

            match current.as_mut() {
                Some(property) => property.push(c),
                None => current = Some(Property::starting_at(c, index)),
            }
        }

        if let Some(mut property) = current {
            property.end_char = end_char;
            self.extend_forward(&mut property, end_char);

            // Still the first property: the backward scan has not run for it yet.
            if properties.is_empty() {
                self.extend_backward(&mut property, start_char);
            }
            properties.push(property);
        }

        properties
    }

    fn extend_backward(&self, property: &mut Property, start_char: usize) {
        let prefix: String = self.chars[..start_char]
            .iter()
            .rev()
            .take_while(|c| **c != PROPERTY_SEPARATOR)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        if !prefix.is_empty() {
            property.name.insert_str(0, &prefix);
            property.partial = true;
        }
    }

    fn extend_forward(&self, property: &mut Property, end_char: usize) {
        let suffix: String = self.chars[end_char..]
            .iter()
            .take_while(|c| **c != PROPERTY_SEPARATOR)
            .collect();

        if !suffix.is_empty() {
            property.name.push_str(&suffix);
            property.partial = true;
        }
    }
}

/// Convenience wrapper over [`PropertyLocator::identify_properties`].
pub fn identify_properties(context: &str, start_char: usize, end_char: usize) -> Vec<Property> {
    PropertyLocator::new(context).identify_properties(start_char, end_char)
}

/// Picks the property a span unambiguously points at.
///
/// 1. Exactly one fully covered property wins.
/// 2. Two or more fully covered properties are a conflict (`None`).
/// 3. Otherwise the partial property with the strictly greatest covered length
///    wins; a tie for the maximum is a conflict.
pub fn determine_best_property(properties: &[Property]) -> Option<&Property> {
    let mut full = properties.iter().filter(|p| !p.partial);
    if let Some(first) = full.next() {
        return match full.next() {
            Some(_) => None,
            None => Some(first),
        };
    }

    let mut best: Option<&Property> = None;
    let mut conflict = false;
    for property in properties.iter().filter(|p| p.partial) {
        match best {
            None => best = Some(property),
            Some(current) if property.length > current.length => {
                best = Some(property);
                conflict = false;
            }
            Some(current) if property.length == current.length => conflict = true,
            Some(_) => {}
        }
    }

    if conflict { None } else { best }
}

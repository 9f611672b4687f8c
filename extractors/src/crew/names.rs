//! Crew name parsing and display formatting.

/// A crew member's name as printed in a manifest: `SURNAME, [PARTICLE,] GIVEN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewName {
    surname: String,
    particle: String,
    given_names: String,
}

impl CrewName {
    /// Parse a raw comma separated name; `None` when there is nothing to parse
    ///
    /// One segment is kept whole, two are surname and given names, three are
    /// surname, particle and given names. Anything after the third segment is
    /// ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let segments: Vec<&str> = raw.split(',').map(str::trim).collect();
        let name = match segments.as_slice() {
            [single] => Self {
                surname: capitalize_words(single),
                particle: String::new(),
                given_names: String::new(),
            },
            [surname, given] => Self {
                surname: capitalize_words(surname),
                particle: String::new(),
                given_names: capitalize_words(given),
            },
            [surname, particle, given, ..] => Self {
                surname: capitalize_words(surname),
                particle: particle.to_lowercase(),
                given_names: capitalize_words(given),
            },
            [] => return None,
        };
        Some(name)
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn particle(&self) -> &str {
        &self.particle
    }

    pub fn given_names(&self) -> &str {
        &self.given_names
    }

    /// `Surname, Given particle`, leaving out empty parts
    pub fn display(&self) -> String {
        let first_part = [self.given_names.as_str(), self.particle.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if first_part.is_empty() {
            self.surname.clone()
        } else {
            format!("{}, {}", self.surname, first_part)
        }
    }

    /// Upper case `SURNAME PARTICLE GIVEN`, the form used in document headers
    pub fn key(&self) -> String {
        name_key(&format!(
            "{} {} {}",
            self.surname, self.particle, self.given_names
        ))
    }
}

/// Upper case and collapse whitespace, for comparing names across layouts
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalize each word, treating hyphen-joined parts as separate words
pub fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.split('-')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

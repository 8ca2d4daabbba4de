use std::collections::HashMap;

use mohawk_nls::{Decoder, Encoding, TextDecoder};

use crate::format::TextSource;

/// Raw text resources keyed by id. Each resource is a run of NUL
/// terminated strings in the release's legacy code page.
#[derive(Debug, Default)]
pub struct TextResourceTable {
    decoder: Decoder,
    resources: HashMap<u16, Vec<u8>>,
}

impl TextResourceTable {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            decoder: Decoder::new(encoding),
            resources: HashMap::new(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.decoder.encoding()
    }

    pub fn insert(&mut self, id: u16, bytes: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.resources.insert(id, bytes.into())
    }

    pub fn contains(&self, id: u16) -> bool {
        self.resources.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn raw_strings(&self, id: u16) -> Option<impl Iterator<Item = &[u8]>> {
        let bytes = self.resources.get(&id)?;
        let body = bytes.strip_suffix(&[0u8]).unwrap_or(bytes);
        Some(body.split(|&b| b == 0))
    }

    /// String `index` of resource `id`, decoded.
    pub fn get(&self, id: u16, index: u16) -> Option<String> {
        let raw = self.raw_strings(id)?.nth(index as usize);
        if raw.is_none() {
            log::debug!("text resource {id} has no string {index}");
        }
        raw.map(|bytes| self.decoder.decode(bytes).into_owned())
    }

    pub fn strings(&self, id: u16) -> Option<Vec<String>> {
        let strings = self
            .raw_strings(id)?
            .map(|bytes| self.decoder.decode(bytes).into_owned())
            .collect();
        Some(strings)
    }
}

impl TextSource for TextResourceTable {
    fn lookup_text(&self, resource: u16, index: u16) -> Option<String> {
        self.get(resource, index)
    }
}

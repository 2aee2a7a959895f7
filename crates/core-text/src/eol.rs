//! End-of-line conventions.

/// Line terminator used when a block's lines are laid out in an arena block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EolType {
    Cr,
    #[default]
    Lf,
    CrLf,
}

impl EolType {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            EolType::Cr => b"\r",
            EolType::Lf => b"\n",
            EolType::CrLf => b"\r\n",
        }
    }

    pub fn byte_len(self) -> usize {
        self.as_bytes().len()
    }

    /// Autodetect the terminator used by `text`.
    ///
    /// The first `\r` decides between CR/LF and bare CR; without any `\r` a
    /// `\n` means LF; text with no terminator at all reports `None`.
    pub fn detect(text: &[u8]) -> Option<EolType> {
        if let Some(i) = text.iter().position(|&b| b == b'\r') {
            if text.get(i + 1) == Some(&b'\n') {
                return Some(EolType::CrLf);
            }
            return Some(EolType::Cr);
        }
        if text.contains(&b'\n') {
            return Some(EolType::Lf);
        }
        None
    }

    /// Byte offsets of every terminator occurrence in `text`.
    pub(crate) fn delimiters(self, text: &[u8]) -> DelimiterIter<'_> {
        DelimiterIter {
            text,
            at: 0,
            eol: self,
        }
    }
}

pub(crate) struct DelimiterIter<'a> {
    text: &'a [u8],
    at: usize,
    eol: EolType,
}

impl Iterator for DelimiterIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let pat = self.eol.as_bytes();
        while self.at + pat.len() <= self.text.len() {
            let i = self.at;
            if &self.text[i..i + pat.len()] == pat {
                self.at = i + pat.len();
                return Some(i);
            }
            self.at += 1;
        }
        None
    }
}

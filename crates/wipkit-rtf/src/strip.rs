//! Markup stripping.

use wipkit_common::codepage;

use crate::lexer::{Lexer, Token};
use crate::{Error, Result};

/// The bytes every rich-text document starts with.
pub const SIGNATURE: &[u8] = b"{\\rtf";

/// Control words whose group holds no visible text.
const DESTINATIONS: &[&[u8]] = &[
    b"aftncn", b"aftnsep", b"aftnsepc", b"annotation", b"atnauthor", b"atndate",
    b"atnicn", b"atnid", b"atnparent", b"atnref", b"atntime", b"atrfend",
    b"atrfstart", b"author", b"background", b"bkmkend", b"bkmkstart", b"blipuid",
    b"buptim", b"category", b"colorschememapping", b"colortbl", b"comment",
    b"company", b"creatim", b"datafield", b"datastore", b"defchp", b"defpap",
    b"do", b"doccomm", b"docvar", b"dptxbxtext", b"ebcend", b"ebcstart",
    b"factoidname", b"falt", b"fchars", b"ffdeftext", b"ffentrymcr", b"ffexitmcr",
    b"ffformat", b"ffhelptext", b"ffl", b"ffname", b"ffstattext", b"field",
    b"file", b"filetbl", b"fldinst", b"fldtype", b"fname", b"fontemb",
    b"fontfile", b"fonttbl", b"footer", b"footerf", b"footerl", b"footerr",
    b"footnote", b"formfield", b"ftncn", b"ftnsep", b"ftnsepc", b"g",
    b"generator", b"gridtbl", b"header", b"headerf", b"headerl", b"headerr",
    b"hl", b"hlfr", b"hlinkbase", b"hlloc", b"hlsrc", b"hsv", b"htmltag",
    b"info", b"keycode", b"keywords", b"latentstyles", b"lchars", b"levelnumbers",
    b"leveltext", b"lfolevel", b"linkval", b"list", b"listlevel", b"listname",
    b"listoverride", b"listoverridetable", b"listpicture", b"liststylename",
    b"listtable", b"listtext", b"lsdlockedexcept", b"macc", b"maccPr", b"mailmerge",
    b"maln", b"malnScr", b"manager", b"margPr", b"mbar", b"mbarPr", b"mbaseJc",
    b"mbegChr", b"mborderBox", b"mborderBoxPr", b"mbox", b"mboxPr", b"mchr",
    b"mcount", b"mctrlPr", b"md", b"mdeg", b"mdegHide", b"mden", b"mdiff",
    b"mdPr", b"me", b"mendChr", b"meqArr", b"meqArrPr", b"mf", b"mfName",
    b"mfPr", b"mfunc", b"mfuncPr", b"mgroupChr", b"mgroupChrPr", b"mgrow",
    b"mhideBot", b"mhideLeft", b"mhideRight", b"mhideTop", b"mhtmltag", b"mlim",
    b"mlimloc", b"mlimlow", b"mlimlowPr", b"mlimupp", b"mlimuppPr", b"mm",
    b"mmaddfieldname", b"mmath", b"mmathPict", b"mmathPr", b"mmaxdist", b"mmc",
    b"mmcJc", b"mmconnectstr", b"mmconnectstrdata", b"mmcPr", b"mmcs",
    b"mmdatasource", b"mmheadersource", b"mmmailsubject", b"mmodso",
    b"mmodsofilter", b"mmodsofldmpdata", b"mmodsomappedname", b"mmodsoname",
    b"mmodsorecipdata", b"mmodsosort", b"mmodsosrc", b"mmodsotable", b"mmodsoudl",
    b"mmodsoudldata", b"mmodsouniquetag", b"mmPr", b"mmquery", b"mmr", b"mnary",
    b"mnaryPr", b"mnoBreak", b"mnum", b"mobjDist", b"moMath", b"moMathPara",
    b"moMathParaPr", b"mopEmu", b"mphant", b"mphantPr", b"mplcHide", b"mpos",
    b"mr", b"mrad", b"mradPr", b"mrPr", b"msepChr", b"mshow", b"mshp", b"msPre",
    b"msPrePr", b"msSub", b"msSubPr", b"msSubSup", b"msSubSupPr", b"msSup",
    b"msSupPr", b"mstrikeBLTR", b"mstrikeH", b"mstrikeTLBR", b"mstrikeV", b"msub",
    b"msubHide", b"msup", b"msupHide", b"mtransp", b"mtype", b"mvertJc", b"mvfmf",
    b"mvfml", b"mvtof", b"mvtol", b"mzeroAsc", b"mzeroDesc", b"mzeroWid",
    b"nesttableprops", b"nextfile", b"nonesttables", b"objalias", b"objclass",
    b"objdata", b"object", b"objname", b"objsect", b"objtime", b"oldcprops",
    b"oldpprops", b"oldsprops", b"oldtprops", b"oleclsid", b"operator", b"panose",
    b"password", b"passwordhash", b"pgp", b"pgptbl", b"picprop", b"pict", b"pn",
    b"pnseclvl", b"pntext", b"pntxta", b"pntxtb", b"printim", b"private",
    b"propname", b"protend", b"protstart", b"protusertbl", b"pxe", b"result",
    b"revtbl", b"revtim", b"rsidtbl", b"rxe", b"shp", b"shpgrp", b"shpinst",
    b"shppict", b"shprslt", b"shptxt", b"sn", b"sp", b"staticval", b"stylesheet",
    b"subject", b"sv", b"svb", b"tc", b"template", b"themedata", b"title", b"txe",
    b"ud", b"upr", b"userprops", b"wgrffmtfilter", b"windowcaption",
    b"writereservation", b"writereservhash", b"xe", b"xform", b"xmlattrname",
    b"xmlattrvalue", b"xmlclose", b"xmlname", b"xmlnstbl", b"xmlopen",
];

/// Text produced by control words that stand for a character.
fn special_word(name: &[u8]) -> Option<&'static str> {
    Some(match name {
        b"par" | b"line" | b"row" => "\n",
        b"sect" | b"page" => "\n\n",
        b"tab" => "\t",
        b"cell" | b"nestcell" => "|",
        b"emdash" => "\u{2014}",
        b"endash" => "\u{2013}",
        b"emspace" => "\u{2003}",
        b"enspace" => "\u{2002}",
        b"qmspace" => "\u{2005}",
        b"bullet" => "\u{2022}",
        b"lquote" => "\u{2018}",
        b"rquote" => "\u{2019}",
        b"ldblquote" => "\u{201c}",
        b"rdblquote" => "\u{201d}",
        _ => return None,
    })
}

/// Text produced by control symbols (`\` followed by a non-letter).
fn special_symbol(symbol: u8) -> Option<&'static str> {
    Some(match symbol {
        b'~' => "\u{a0}",
        b'-' => "\u{ad}",
        b'_' => "\u{2011}",
        b'{' => "{",
        b'}' => "}",
        b'\\' => "\\",
        b'\n' | b'\r' => "\n",
        _ => return None,
    })
}

/// Check if data starts with the rich-text signature.
pub fn is_rich_text(data: &[u8]) -> bool {
    data.starts_with(SIGNATURE)
}

/// Strip rich-text markup, returning the visible text.
///
/// Raw bytes and `\'hh` escapes are decoded as Windows-1252. `\uN` escapes
/// are decoded as UTF-16 code units, so a surrogate pair written as two
/// escapes yields one character, and the following `\ucN` fallback
/// characters are skipped. An unpaired surrogate becomes U+FFFD.
pub fn strip(input: &[u8]) -> Result<String> {
    if !is_rich_text(input) {
        return Err(Error::MissingSignature {
            actual: input[..SIGNATURE.len().min(input.len())].to_vec(),
        });
    }

    let mut lexer = Lexer::new(input);
    let mut state = Stripper::default();

    while let Some(token) = lexer.next_token()? {
        match token {
            Token::GroupStart => {
                state.curskip = 0;
                state.stack.push((state.ucskip, state.ignorable));
            }
            Token::GroupEnd { offset } => {
                state.curskip = 0;
                let (ucskip, ignorable) = state
                    .stack
                    .pop()
                    .ok_or(Error::UnbalancedGroup { offset })?;
                state.ucskip = ucskip;
                state.ignorable = ignorable;
            }
            Token::Symbol(symbol) => {
                state.curskip = 0;
                if symbol == b'*' {
                    state.ignorable = true;
                } else if let Some(text) = special_symbol(symbol) {
                    state.push_str(text);
                }
            }
            Token::Word { name, param } => {
                state.curskip = 0;
                if name == b"bin" {
                    lexer.skip(param.unwrap_or(0).max(0) as usize);
                } else if DESTINATIONS.contains(&name) {
                    state.ignorable = true;
                } else if state.ignorable {
                    // Inside a destination, nothing below produces output.
                } else if let Some(text) = special_word(name) {
                    state.push_str(text);
                } else if name == b"uc" {
                    state.ucskip = param.unwrap_or(1).max(0) as usize;
                } else if name == b"u" {
                    if let Some(unit) = param {
                        let code = if unit < 0 { unit + 0x10000 } else { unit };
                        match u16::try_from(code) {
                            Ok(unit) => state.push_unit(unit),
                            Err(_) => state.push_char(char::REPLACEMENT_CHARACTER),
                        }
                        state.curskip = state.ucskip;
                    }
                }
            }
            Token::Hex(byte) | Token::Text(byte) => {
                if state.curskip > 0 {
                    state.curskip -= 1;
                } else {
                    state.push_byte(byte);
                }
            }
        }
    }

    if !state.stack.is_empty() {
        return Err(Error::UnclosedGroup {
            depth: state.stack.len(),
        });
    }

    Ok(state.finish())
}

/// A stripped annotation with its padding terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The plain text.
    pub text: String,
    /// Whether a trailing NUL was found and removed.
    pub terminated: bool,
}

/// Strip an annotation blob as stored by the instrument.
///
/// Annotation fields are padded with one NUL after the closing brace. Exactly
/// one trailing NUL is removed. When it is missing the text is returned
/// unchanged and [`Annotation::terminated`] is false.
pub fn strip_annotation(input: &[u8]) -> Result<Annotation> {
    let mut text = strip(input)?;
    let terminated = text.ends_with('\0');
    if terminated {
        text.pop();
    }
    Ok(Annotation { text, terminated })
}

#[derive(Debug)]
struct Stripper {
    stack: Vec<(usize, bool)>,
    ignorable: bool,
    ucskip: usize,
    curskip: usize,
    out: String,
    pending: Vec<u8>,
    /// High surrogate waiting for its low half.
    surrogate: Option<u16>,
}

impl Default for Stripper {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            ignorable: false,
            ucskip: 1,
            curskip: 0,
            out: String::new(),
            pending: Vec::new(),
            surrogate: None,
        }
    }
}

impl Stripper {
    fn push_byte(&mut self, byte: u8) {
        if !self.ignorable {
            self.flush_surrogate();
            self.pending.push(byte);
        }
    }

    fn push_char(&mut self, ch: char) {
        if !self.ignorable {
            self.flush();
            self.flush_surrogate();
            self.out.push(ch);
        }
    }

    fn push_str(&mut self, text: &str) {
        if !self.ignorable {
            self.flush();
            self.flush_surrogate();
            self.out.push_str(text);
        }
    }

    /// Push one UTF-16 code unit from a `\uN` escape.
    fn push_unit(&mut self, unit: u16) {
        if self.ignorable {
            return;
        }
        self.flush();
        match (self.surrogate.take(), unit) {
            (Some(high), 0xDC00..=0xDFFF) => {
                let ch = char::decode_utf16([high, unit])
                    .next()
                    .and_then(|decoded| decoded.ok())
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.out.push(ch);
            }
            (high, 0xD800..=0xDBFF) => {
                if high.is_some() {
                    self.out.push(char::REPLACEMENT_CHARACTER);
                }
                self.surrogate = Some(unit);
            }
            (high, _) => {
                if high.is_some() {
                    self.out.push(char::REPLACEMENT_CHARACTER);
                }
                let ch = char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
                self.out.push(ch);
            }
        }
    }

    fn flush_surrogate(&mut self) {
        if self.surrogate.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.out.push_str(&codepage::decode(&self.pending));
            self.pending.clear();
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.flush_surrogate();
        self.out
    }
}

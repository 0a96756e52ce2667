//!
//! Parser for the compact type notation printed by `Display`:
//!
//! ```text
//! type     := function | tuple | tensor
//! function := '(' type '->' type ')'
//! tuple    := '<' [ element (',' element)* ] '>'
//! element  := ident '=' type | type
//! tensor   := dtype [ '[' [ dim (',' dim)* ] ']' ]
//! dim      := digits | '?'
//! ```
//!
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::structure::Structure;

use super::{DType, Type};

impl FromStr for Type {
  type Err = Error;

  fn from_str(s: &str) -> Result<Type> {
    let mut cursor = Cursor { src: s, pos: 0 };
    let t = cursor.parse_type()?;
    cursor.skip_ws();
    if cursor.pos != s.len() {
      return Err(cursor.error("end of input"));
    }
    Ok(t)
  }
}

struct Cursor<'a> {
  src: &'a str,
  pos: usize,
}

impl<'a> Cursor<'a> {
  fn rest(&self) -> &'a str {
    &self.src[self.pos..]
  }

  fn skip_ws(&mut self) {
    let trimmed = self.rest().trim_start();
    self.pos = self.src.len() - trimmed.len();
  }

  fn peek(&mut self) -> Option<char> {
    self.skip_ws();
    self.rest().chars().next()
  }

  fn eat(&mut self, token: &str) -> bool {
    self.skip_ws();
    if self.rest().starts_with(token) {
      self.pos += token.len();
      true
    } else {
      false
    }
  }

  fn expect(&mut self, token: &str) -> Result<()> {
    if self.eat(token) {
      Ok(())
    } else {
      Err(self.error(&format!("'{}'", token)))
    }
  }

  fn error(&self, expected: &str) -> Error {
    let found = match self.rest().chars().next() {
      Some(c) => format!("'{}'", c),
      None => "end of input".to_string(),
    };
    Error::MalformedType(format!(
      "expected {} at byte {} of '{}', found {}",
      expected, self.pos, self.src, found
    ))
  }

  fn ident(&mut self) -> Option<&'a str> {
    self.skip_ws();
    let rest = self.rest();
    let len = rest
      .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
      .unwrap_or(rest.len());
    if len == 0 || rest.starts_with(|c: char| c.is_ascii_digit()) {
      return None;
    }
    self.pos += len;
    Some(&rest[..len])
  }

  fn parse_type(&mut self) -> Result<Type> {
    match self.peek() {
      Some('(') => self.parse_function(),
      Some('<') => self.parse_tuple(),
      _ => {
        let name = self.ident().ok_or_else(|| self.error("a type"))?;
        self.parse_tensor(name)
      }
    }
  }

  fn parse_function(&mut self) -> Result<Type> {
    self.expect("(")?;
    let parameter = self.parse_type()?;
    self.expect("->")?;
    let result = self.parse_type()?;
    self.expect(")")?;
    Ok(Type::function(parameter, result))
  }

  fn parse_tuple(&mut self) -> Result<Type> {
    self.expect("<")?;
    let mut elements = vec![];
    if !self.eat(">") {
      loop {
        elements.push(self.parse_element()?);
        if self.eat(">") {
          break;
        }
        self.expect(",")?;
      }
    }
    Structure::new(elements)
      .map(Type::Tuple)
      .map_err(|e| Error::MalformedType(e.to_string()))
  }

  fn parse_element(&mut self) -> Result<(Option<String>, Type)> {
    let start = self.pos;
    if let Some(name) = self.ident() {
      if self.eat("=") {
        return Ok((Some(name.to_string()), self.parse_type()?));
      }
      // not a name after all, just a tensor dtype
      self.pos = start;
    }
    Ok((None, self.parse_type()?))
  }

  fn parse_tensor(&mut self, dtype_name: &str) -> Result<Type> {
    let dtype = DType::from_name(dtype_name).ok_or_else(|| {
      Error::MalformedType(format!("unknown dtype '{}' in '{}'", dtype_name, self.src))
    })?;
    let mut dims = vec![];
    if self.eat("[") && !self.eat("]") {
      loop {
        dims.push(self.parse_dim()?);
        if self.eat("]") {
          break;
        }
        self.expect(",")?;
      }
    }
    Ok(Type::tensor(dtype, dims))
  }

  fn parse_dim(&mut self) -> Result<Option<u64>> {
    if self.eat("?") {
      return Ok(None);
    }
    self.skip_ws();
    let rest = self.rest();
    let len = rest
      .find(|c: char| !c.is_ascii_digit())
      .unwrap_or(rest.len());
    let n = rest[..len]
      .parse::<u64>()
      .map_err(|_| self.error("a dimension"))?;
    self.pos += len;
    Ok(Some(n))
  }
}

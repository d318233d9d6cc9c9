//! LaTeX rendering of symbolic results.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use num::rational::Rational64;
use num::{One, Signed};
use tracing::info;

use crate::builder::CoefficientMatrix;
use crate::symbolic::{Atom, Equation, Expr, Monomial};

/// Types that can be typeset as a LaTeX math expression.
pub trait ToLatex {
    /// Math-mode source, without surrounding delimiters.
    fn to_latex(&self) -> String;
}

impl ToLatex for Atom {
    fn to_latex(&self) -> String {
        match self {
            Atom::Symbol(symbol) => symbol.name().to_string(),
            Atom::Func(func, argument) => {
                format!("\\{}{{\\left({}\\right)}}", func.name(), argument.to_latex())
            }
        }
    }
}

impl ToLatex for Monomial {
    fn to_latex(&self) -> String {
        self.powers()
            .map(|(atom, exponent)| match (atom, exponent) {
                (_, 1) => atom.to_latex(),
                (Atom::Func(..), _) => {
                    // \cos^{2}{\left(x\right)}
                    let rendered = atom.to_latex();
                    let (head, tail) = rendered.split_at(atom_head_len(atom));
                    format!("{head}^{{{exponent}}}{tail}")
                }
                (Atom::Symbol(_), _) => format!("{}^{{{exponent}}}", atom.to_latex()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ToLatex for Expr {
    fn to_latex(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut output = String::new();
        for (index, (monomial, coefficient)) in self.terms().enumerate() {
            let sign = match (index, coefficient.is_negative()) {
                (0, true) => "-",
                (0, false) => "",
                (_, true) => " - ",
                (_, false) => " + ",
            };
            output.push_str(sign);
            let magnitude = coefficient.abs();
            if monomial.is_one() {
                output.push_str(&rational_latex(magnitude));
            } else if magnitude.is_one() {
                output.push_str(&monomial.to_latex());
            } else {
                write!(
                    output,
                    "{} {}",
                    rational_latex(magnitude),
                    monomial.to_latex()
                )
                .expect("writing to string cannot fail");
            }
        }
        output
    }
}

impl ToLatex for Equation {
    fn to_latex(&self) -> String {
        format!("{} = {}", self.lhs.to_latex(), self.rhs.to_latex())
    }
}

impl ToLatex for CoefficientMatrix {
    fn to_latex(&self) -> String {
        let rows = self
            .entries
            .iter()
            .map(|row| {
                row.iter()
                    .map(ToLatex::to_latex)
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\ ");
        format!("\\begin{{pmatrix}} {rows} \\end{{pmatrix}}")
    }
}

/// Length of `\name` in the rendering of a function atom.
fn atom_head_len(atom: &Atom) -> usize {
    match atom {
        Atom::Func(func, _) => func.name().len() + 1,
        Atom::Symbol(_) => 0,
    }
}

fn rational_latex(value: Rational64) -> String {
    if value.is_integer() {
        value.numer().to_string()
    } else {
        format!("\\frac{{{}}}{{{}}}", value.numer(), value.denom())
    }
}

/// Escape text for use outside math mode.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(character);
            }
            _ => escaped.push(character),
        }
    }
    escaped
}

/// One described expression in a [`LatexDocument`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatexSection {
    /// Plain text heading.
    pub description: String,
    /// Math-mode body.
    pub body: String,
    /// Whether the expression carries an equation number.
    pub numbered: bool,
}

impl LatexSection {
    fn render(&self, output: &mut String) {
        let body = format!(
            "\\begin{{adjustbox}}{{max width=\\textwidth}}$\\displaystyle {}$\\end{{adjustbox}}",
            self.body
        );
        writeln!(output, "\\section*{{{}}}", escape(&self.description))
            .expect("writing to string cannot fail");
        if self.numbered {
            writeln!(output, "\\begin{{equation}}\n{body}\n\\end{{equation}}")
                .expect("writing to string cannot fail");
        } else {
            writeln!(output, "\\[\n{body}\n\\]").expect("writing to string cannot fail");
        }
        output.push('\n');
    }
}

/// A standalone LaTeX article made of described expressions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LatexDocument {
    title: String,
    sections: Vec<LatexSection>,
}

impl LatexDocument {
    /// Empty document with a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section.
    pub fn push<T>(&mut self, description: impl Into<String>, body: &T, numbered: bool)
    where
        T: ToLatex + ?Sized,
    {
        self.sections.push(LatexSection {
            description: description.into(),
            body: body.to_latex(),
            numbered,
        });
    }

    /// Sections in insertion order.
    #[must_use]
    pub fn sections(&self) -> &[LatexSection] {
        &self.sections
    }

    /// Complete, compilable source.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::from(
            "\\documentclass{article}\n\
             \\usepackage{amsmath}\n\
             \\usepackage{amssymb}\n\
             \\usepackage{amsfonts}\n\
             \\usepackage[margin=2cm]{geometry}\n\
             \\usepackage{graphicx}\n\
             \\usepackage{adjustbox}\n\
             \\usepackage{hyperref}\n\n",
        );
        writeln!(output, "\\title{{{}}}", escape(&self.title))
            .expect("writing to string cannot fail");
        output.push_str("\\date{}\n\n\\begin{document}\n\\maketitle\n\n");
        for section in &self.sections {
            section.render(&mut output);
        }
        output.push_str("\\end{document}\n");
        output
    }

    /// Write the document to `path`, creating parent directories and
    /// replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] when a directory or the file
    /// cannot be written.
    pub fn write(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        info!(path = %path.display(), sections = self.sections.len(), "wrote LaTeX document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::{cos, Symbol};

    #[test]
    fn powers_of_functions_use_prefix_exponents() {
        let a = Expr::symbol(&Symbol::new("a"));
        let expr = Expr::one() - Expr::integer(2) * cos(a.clone()).pow(2);
        assert_eq!(expr.to_latex(), "1 - 2 \\cos^{2}{\\left(a\\right)}");
    }

    #[test]
    fn negative_exponents_and_fractions() {
        let length = Expr::symbol(&Symbol::new("L"));
        let expr = Expr::rational(Rational64::new(1, 2))
            * length.inverse().expect("monomial");
        assert_eq!(expr.to_latex(), "\\frac{1}{2} L^{-1}");
    }

    #[test]
    fn descriptions_are_escaped() {
        assert_eq!(escape("M_c & 50%"), "M\\_c \\& 50\\%");
    }

    #[test]
    fn numbered_and_unnumbered_sections() {
        let mut document = LatexDocument::new("Beam");
        document.push("numbered", &Expr::one(), true);
        document.push("plain", &Expr::zero(), false);
        let source = document.render();
        assert!(source.starts_with("\\documentclass{article}"));
        assert!(source.contains("\\usepackage{adjustbox}"));
        assert!(source.contains("\\begin{equation}"));
        assert!(source.contains("\\[\n"));
        assert!(source.trim_end().ends_with("\\end{document}"));
    }
}

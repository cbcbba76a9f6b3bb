use super::Exp;

impl Exp {
    #[must_use]
    pub fn replace(&self, pat: &Exp, with: &Exp) -> Self {
        if self == pat {
            with.clone()
        } else {
            self.map(|e| e.replace(pat, with))
        }
    }

    /// Replaces every occurrence of the named variable.
    #[must_use]
    pub fn substitute_var(&self, var: &str, with: &Exp) -> Self {
        self.replace(&Exp::var(var), with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_variables() {
        let exp: Exp = "x^2 + x".parse().unwrap();
        let substituted = exp.substitute_var("x", &Exp::var("y"));
        assert_eq!(substituted, "y^2 + y".parse().unwrap());
    }

    #[test]
    fn replace_matches_whole_subexpressions() {
        let exp: Exp = "sin(x^2)".parse().unwrap();
        let pat: Exp = "x^2".parse().unwrap();
        let replaced = exp.replace(&pat, &Exp::var("u"));
        assert_eq!(replaced, "sin(u)".parse().unwrap());
    }
}

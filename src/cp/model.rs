use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Poignée vers une variable déclarée dans un [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub name: String,
    pub lower: i64,
    pub upper: i64,
}

impl VarDecl {
    pub fn is_boolean(&self) -> bool {
        self.lower == 0 && self.upper == 1
    }
}

/// Somme pondérée de variables plus une constante.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, i64)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
            constant: 0,
        }
    }

    pub fn term(mut self, var: VarId, coef: i64) -> Self {
        self.terms.push((var, coef));
        self
    }

    pub fn push(&mut self, var: VarId, coef: i64) {
        self.terms.push((var, coef));
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn eval(&self, values: &[i64]) -> i64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coef)| coef * values[var.0])
                .sum::<i64>()
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self::sum([var])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl Relation {
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Eq => write!(f, "=="),
            Relation::Le => write!(f, "<="),
            Relation::Ge => write!(f, ">="),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub bound: i64,
}

impl LinearConstraint {
    pub fn new(expr: LinearExpr, relation: Relation, bound: i64) -> Self {
        Self {
            expr,
            relation,
            bound,
        }
    }

    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        self.relation.holds(self.expr.eval(values), self.bound)
    }
}

/// Tuples autorisés d'une contrainte de table, partageables entre contraintes.
pub type AllowedTuples = Arc<Vec<Vec<i64>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Linear(LinearConstraint),
    /// Ne tient que si `literal` vaut 1.
    Conditional {
        constraint: LinearConstraint,
        literal: VarId,
    },
    /// Les valeurs de `vars` forment l'un des tuples autorisés.
    Table {
        vars: Vec<VarId>,
        tuples: AllowedTuples,
    },
}

impl Constraint {
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        match self {
            Constraint::Linear(c) => c.is_satisfied(values),
            Constraint::Conditional {
                constraint,
                literal,
            } => values[literal.0] == 0 || constraint.is_satisfied(values),
            Constraint::Table { vars, tuples } => tuples
                .iter()
                .any(|tuple| vars.iter().zip(tuple).all(|(v, t)| values[v.0] == *t)),
        }
    }
}

/// Défaut structurel détecté avant résolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ModelDefect(pub String);

/// Contexte de construction : variables, contraintes et objectif accumulés
/// par chaque étape du constructeur, passé explicitement par `&mut`.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    vars: Vec<VarDecl>,
    constraints: Vec<Constraint>,
    objective: Option<LinearExpr>,
}

impl CpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_bool_var<S: Into<String>>(&mut self, name: S) -> VarId {
        self.new_int_var(0, 1, name)
    }

    pub fn new_int_var<S: Into<String>>(&mut self, lower: i64, upper: i64, name: S) -> VarId {
        self.vars.push(VarDecl {
            name: name.into(),
            lower,
            upper,
        });
        VarId(self.vars.len() - 1)
    }

    pub fn add_linear(&mut self, expr: LinearExpr, relation: Relation, bound: i64) {
        self.constraints
            .push(Constraint::Linear(LinearConstraint::new(expr, relation, bound)));
    }

    pub fn add_conditional(&mut self, constraint: LinearConstraint, literal: VarId) {
        self.constraints.push(Constraint::Conditional {
            constraint,
            literal,
        });
    }

    pub fn add_table(&mut self, vars: Vec<VarId>, tuples: AllowedTuples) {
        self.constraints.push(Constraint::Table { vars, tuples });
    }

    /// Fixe une variable à une valeur.
    pub fn fix(&mut self, var: VarId, value: i64) {
        self.add_linear(LinearExpr::from(var), Relation::Eq, value);
    }

    pub fn minimize(&mut self, expr: LinearExpr) {
        self.objective = Some(expr);
    }

    pub fn vars(&self) -> &[VarDecl] {
        &self.vars
    }

    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&LinearExpr> {
        self.objective.as_ref()
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Bornes atteignables d'une expression d'après les domaines.
    pub fn expr_bounds(&self, expr: &LinearExpr) -> (i64, i64) {
        expr.terms.iter().fold(
            (expr.constant, expr.constant),
            |(lo, hi), (var, coef)| {
                let decl = &self.vars[var.0];
                let a = coef * decl.lower;
                let b = coef * decl.upper;
                (lo + a.min(b), hi + a.max(b))
            },
        )
    }

    /// Vérifie la cohérence structurelle du modèle.
    pub fn validate(&self) -> Result<(), ModelDefect> {
        for decl in &self.vars {
            if decl.lower > decl.upper {
                return Err(ModelDefect(format!(
                    "variable {} has empty domain [{}, {}]",
                    decl.name, decl.lower, decl.upper
                )));
            }
        }
        let known = |var: &VarId| var.0 < self.vars.len();
        for (idx, constraint) in self.constraints.iter().enumerate() {
            match constraint {
                Constraint::Linear(c) => {
                    if !c.expr.terms.iter().all(|(v, _)| known(v)) {
                        return Err(ModelDefect(format!("constraint #{idx} references an unknown variable")));
                    }
                }
                Constraint::Conditional {
                    constraint,
                    literal,
                } => {
                    if !known(literal) || !constraint.expr.terms.iter().all(|(v, _)| known(v)) {
                        return Err(ModelDefect(format!("constraint #{idx} references an unknown variable")));
                    }
                    if !self.vars[literal.0].is_boolean() {
                        return Err(ModelDefect(format!(
                            "constraint #{idx} is enforced by non-boolean variable {}",
                            self.vars[literal.0].name
                        )));
                    }
                }
                Constraint::Table { vars, tuples } => {
                    if !vars.iter().all(known) {
                        return Err(ModelDefect(format!("constraint #{idx} references an unknown variable")));
                    }
                    if let Some(tuple) = tuples.iter().find(|t| t.len() != vars.len()) {
                        return Err(ModelDefect(format!(
                            "table constraint #{idx} has {} variables but a tuple of arity {}",
                            vars.len(),
                            tuple.len()
                        )));
                    }
                }
            }
        }
        if let Some(objective) = &self.objective {
            if !objective.terms.iter().all(|(v, _)| known(v)) {
                return Err(ModelDefect("objective references an unknown variable".to_string()));
            }
        }
        Ok(())
    }

    /// Index de la première contrainte violée par `values`, le cas échéant.
    pub fn check(&self, values: &[i64]) -> Result<(), usize> {
        if values.len() != self.vars.len() {
            return Err(0);
        }
        let in_domain = self
            .vars
            .iter()
            .zip(values)
            .all(|(decl, v)| (decl.lower..=decl.upper).contains(v));
        if !in_domain {
            return Err(0);
        }
        match self.constraints.iter().position(|c| !c.is_satisfied(values)) {
            Some(idx) => Err(idx),
            None => Ok(()),
        }
    }
}

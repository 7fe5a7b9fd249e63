// ABOUTME: AST node definitions; pure data produced by the parser

/// Binary operators after parsing. `say` concatenation desugars to Add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Trailing output modifiers on `say`, applied in source order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SayEnd {
    Newline,
    Space,
    Tab,
}

impl SayEnd {
    pub fn text(&self) -> &'static str {
        match self {
            SayEnd::Newline => "\n",
            SayEnd::Space => " ",
            SayEnd::Tab => "\t",
        }
    }
}

/// One piece of an interpolated string after the parser has re-parsed
/// the captured expression text.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpPart {
    Lit(String),
    Expr(Node),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    InterpStr(Vec<InterpPart>),
    Ident(String),
    Assign {
        name: String,
        value: Box<Node>,
    },
    CompoundAssign {
        name: String,
        op: BinOp,
        value: Box<Node>,
    },
    Binary {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },
    Unary {
        op: UnOp,
        operand: Box<Node>,
    },
    List(Vec<Node>),
    MapLit(Vec<(Node, Node)>),
    Index {
        target: Box<Node>,
        index: Box<Node>,
    },
    IndexSet {
        target: Box<Node>,
        index: Box<Node>,
        value: Box<Node>,
    },
    /// `target.name(args)` - dispatched on the receiver's runtime type
    MethodCall {
        target: Box<Node>,
        method: String,
        args: Vec<Node>,
    },
    /// `target.name` without an argument list - map entry or module member
    FieldGet {
        target: Box<Node>,
        field: String,
    },
    FnDef {
        name: String,
        params: Vec<String>,
        body: Box<Node>,
        /// informational only, never checked
        return_type: Option<String>,
    },
    Call {
        name: String,
        args: Vec<Node>,
    },
    Return(Option<Box<Node>>),
    Lambda {
        params: Vec<String>,
        body: Box<Node>,
    },
    If {
        cond: Box<Node>,
        then: Box<Node>,
        otherwise: Option<Box<Node>>,
    },
    While {
        cond: Box<Node>,
        body: Box<Node>,
    },
    ForRange {
        var: String,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        reverse: bool,
        body: Box<Node>,
    },
    ForEach {
        var: String,
        iterable: Box<Node>,
        body: Box<Node>,
    },
    Break,
    Continue,
    Say {
        value: Option<Box<Node>>,
        ends: Vec<SayEnd>,
    },
    Take {
        prompt: Option<Box<Node>>,
    },
    Use {
        module: String,
    },
    /// `&&name.with.dots` - looked up in a fixed catalog
    Command {
        path: String,
    },
    Block(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: u32,
    pub column: u32,
}

impl Node {
    pub fn new(kind: NodeKind, line: u32, column: u32) -> Self {
        Node { kind, line, column }
    }
}

//! GML reader for real backbone datasets (Topology Zoo style).

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use log::warn;

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::topology::types::NodeId;

/// Represents a node in a GML graph
#[derive(Debug, Clone)]
pub struct GmlNode {
    pub id: u64,
    pub label: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

/// Represents an edge in a GML graph
#[derive(Debug, Clone)]
pub struct GmlEdge {
    pub source: u64,
    pub target: u64,
    pub attributes: BTreeMap<String, String>,
}

/// Represents a complete GML graph
#[derive(Debug, Clone, Default)]
pub struct GmlGraph {
    pub nodes: Vec<GmlNode>,
    pub edges: Vec<GmlEdge>,
    pub attributes: BTreeMap<String, String>,
}

/// Token types for GML parsing
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Number(String),
    String(String),
    LeftBracket,
    RightBracket,
    Eof,
}

/// Simple lexer for GML format
struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    if let Some(escaped) = self.current_char {
                        match escaped {
                            'n' => result.push('\n'),
                            't' => result.push('\t'),
                            '\\' => result.push('\\'),
                            '"' => result.push('"'),
                            _ => {
                                result.push('\\');
                                result.push(escaped);
                            }
                        }
                        self.advance();
                    }
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(TopologyError::malformed("GML: unterminated string literal"))
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-' | '+') {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();

            return match self.current_char {
                None => Ok(Token::Eof),
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some('[') => {
                    self.advance();
                    Ok(Token::LeftBracket)
                }
                Some(']') => {
                    self.advance();
                    Ok(Token::RightBracket)
                }
                Some('"') => Ok(Token::String(self.read_string()?)),
                Some(ch) if ch.is_alphabetic() || ch == '_' => Ok(Token::Identifier(self.read_word())),
                Some(ch) if ch.is_numeric() || ch == '-' || ch == '+' || ch == '.' => {
                    Ok(Token::Number(self.read_word()))
                }
                Some(ch) => Err(TopologyError::malformed(format!(
                    "GML: unexpected character '{}' at offset {}",
                    ch, self.position
                ))),
            };
        }
    }
}

/// Recursive-descent parser over the token stream
struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    fn new(mut lexer: Lexer) -> Result<Self> {
        let current_token = lexer.next_token()?;
        Ok(Self {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, expected: &str) -> TopologyError {
        TopologyError::malformed(format!(
            "GML: expected {}, found {:?}",
            expected, self.current_token
        ))
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<()> {
        match &self.current_token {
            Token::Identifier(id) if id == expected => self.advance(),
            _ => Err(self.error(&format!("'{}'", expected))),
        }
    }

    fn expect_left_bracket(&mut self) -> Result<()> {
        match self.current_token {
            Token::LeftBracket => self.advance(),
            _ => Err(self.error("'['")),
        }
    }

    fn expect_right_bracket(&mut self) -> Result<()> {
        match self.current_token {
            Token::RightBracket => self.advance(),
            _ => Err(self.error("']'")),
        }
    }

    /// Scalar value, or `None` for a nested list (e.g. `graphics [ ... ]`)
    fn parse_value(&mut self) -> Result<Option<String>> {
        match &self.current_token {
            Token::Identifier(val) | Token::Number(val) | Token::String(val) => {
                let result = val.clone();
                self.advance()?;
                Ok(Some(result))
            }
            Token::LeftBracket => {
                self.skip_list()?;
                Ok(None)
            }
            _ => Err(self.error("value")),
        }
    }

    fn skip_list(&mut self) -> Result<()> {
        self.expect_left_bracket()?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.current_token {
                Token::LeftBracket => depth += 1,
                Token::RightBracket => depth -= 1,
                Token::Eof => return Err(self.error("']'")),
                _ => {}
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Key/value pairs up to the closing bracket of the current block
    fn parse_block(&mut self, what: &str) -> Result<BTreeMap<String, String>> {
        let mut attributes = BTreeMap::new();
        while self.current_token != Token::RightBracket {
            match &self.current_token {
                Token::Identifier(key) => {
                    let key = key.clone();
                    self.advance()?;
                    if let Some(value) = self.parse_value()? {
                        attributes.insert(key, value);
                    }
                }
                _ => return Err(self.error(&format!("attribute name in {}", what))),
            }
        }
        self.expect_right_bracket()?;
        Ok(attributes)
    }

    fn parse_node(&mut self) -> Result<GmlNode> {
        self.expect_identifier("node")?;
        self.expect_left_bracket()?;
        let mut attributes = self.parse_block("node")?;

        let id = take_id(&mut attributes, "id", "node")?;
        let label = attributes.remove("label");
        Ok(GmlNode {
            id,
            label,
            attributes,
        })
    }

    fn parse_edge(&mut self) -> Result<GmlEdge> {
        self.expect_identifier("edge")?;
        self.expect_left_bracket()?;
        let mut attributes = self.parse_block("edge")?;

        let source = take_id(&mut attributes, "source", "edge")?;
        let target = take_id(&mut attributes, "target", "edge")?;
        Ok(GmlEdge {
            source,
            target,
            attributes,
        })
    }

    fn parse_graph(&mut self) -> Result<GmlGraph> {
        // Zoo files may carry top-level metadata such as `Creator "yEd"`
        while let Token::Identifier(keyword) = &self.current_token {
            if keyword == "graph" {
                break;
            }
            self.advance()?;
            self.parse_value()?;
        }
        self.expect_identifier("graph")?;
        self.expect_left_bracket()?;

        let mut graph = GmlGraph::default();
        while self.current_token != Token::RightBracket {
            match &self.current_token {
                Token::Identifier(keyword) => match keyword.as_str() {
                    "node" => graph.nodes.push(self.parse_node()?),
                    "edge" => graph.edges.push(self.parse_edge()?),
                    _ => {
                        let key = keyword.clone();
                        self.advance()?;
                        if let Some(value) = self.parse_value()? {
                            graph.attributes.insert(key, value);
                        }
                    }
                },
                _ => return Err(self.error("keyword in graph")),
            }
        }
        self.expect_right_bracket()?;
        Ok(graph)
    }
}

fn take_id(attributes: &mut BTreeMap<String, String>, key: &str, what: &str) -> Result<u64> {
    let raw = attributes
        .remove(key)
        .ok_or_else(|| TopologyError::malformed(format!("GML: {} missing required '{}'", what, key)))?;
    raw.parse::<u64>()
        .map_err(|_| TopologyError::malformed(format!("GML: invalid {} {}: {}", what, key, raw)))
}

/// Parse GML text
pub fn parse_gml_str(content: &str) -> Result<GmlGraph> {
    let mut parser = Parser::new(Lexer::new(content))?;
    parser.parse_graph()
}

/// Parse a GML file and return a GmlGraph object
pub fn parse_gml_file(path: &Path) -> Result<GmlGraph> {
    let content = super::read_resource(path)?;
    parse_gml_str(&content)
}

/// Check ids are unique and every edge references a declared node
pub fn validate_topology(graph: &GmlGraph) -> Result<()> {
    let mut node_ids = HashSet::new();
    for node in &graph.nodes {
        if !node_ids.insert(node.id) {
            return Err(TopologyError::malformed(format!("GML: duplicate node id {}", node.id)));
        }
    }
    for edge in &graph.edges {
        for end in [edge.source, edge.target] {
            if !node_ids.contains(&end) {
                return Err(TopologyError::malformed(format!(
                    "GML: edge references non-existent node {}",
                    end
                )));
            }
        }
    }
    Ok(())
}

impl GmlGraph {
    /// Undirected graph with labels and metadata kept as node attributes
    ///
    /// Self-loops are dropped and repeated edges collapse into one.
    pub fn to_graph(&self) -> Result<Graph> {
        validate_topology(self)?;
        let mut graph = Graph::new();
        for node in &self.nodes {
            let record = graph.add_node(node.id);
            record.attributes = node.attributes.clone();
            if let Some(label) = &node.label {
                record.attributes.insert("label".to_string(), label.clone());
            }
        }
        for edge in &self.edges {
            if edge.source == edge.target {
                warn!("GML: skipping self-loop on node {}", edge.source);
                continue;
            }
            let (u, v) = (NodeId::Num(edge.source), NodeId::Num(edge.target));
            if graph.has_edge(&u, &v) {
                warn!("GML: duplicate edge {}-{}", u, v);
            }
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }
}

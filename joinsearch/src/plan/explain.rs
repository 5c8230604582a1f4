use crate::operand::{OperandId, ScanOperand};
use ptree::print_config::UTF_CHARS;
use ptree::{write_tree_with, PrintConfig, Style, TreeItem};
use std::borrow::Cow;
use std::default::Default;
use std::io::{BufWriter, Error, ErrorKind, Write};

/// One operand of a committed join chain, its inner join is its only child.
#[derive(Clone)]
struct ChainNode<'a> {
    operands: &'a [ScanOperand],
    id: OperandId,
}

impl<'a> TreeItem for ChainNode<'a> {
    type Child = Self;

    fn write_self<W: Write>(&self, f: &mut W, style: &Style) -> std::io::Result<()> {
        let operand = &self.operands[self.id];
        match operand.access() {
            Some(access) => write!(f, "{}", style.paint(format!("{} [{}]", operand, access))),
            None => write!(f, "{}", style.paint(operand)),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        let inner = self.operands[self.id].join().map(|id| ChainNode {
            operands: self.operands,
            id,
        });
        Cow::from(inner.into_iter().collect::<Vec<ChainNode<'a>>>())
    }
}

/// Write the nested loop chain starting at `top`.
pub fn explain_chain<W: Write>(
    operands: &[ScanOperand],
    top: OperandId,
    output: &mut W,
) -> std::io::Result<()> {
    let config = PrintConfig {
        indent: 3,
        characters: UTF_CHARS.into(),
        ..Default::default()
    };
    write_tree_with(&ChainNode { operands, id: top }, output, &config)
}

pub fn explain_chain_to_string(
    operands: &[ScanOperand],
    top: OperandId,
) -> std::io::Result<String> {
    let mut buf = BufWriter::new(Vec::new());

    explain_chain(operands, top, &mut buf)?;

    let bytes = buf.into_inner()?;
    String::from_utf8(bytes).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use crate::operand::{AccessChoice, IndexRef, ScanOperand};
    use crate::plan::explain::explain_chain_to_string;

    #[test]
    fn test_explain_unscored_chain() {
        let mut operands = vec![
            ScanOperand::new("t1"),
            ScanOperand::new("t2").with_alias("x"),
        ];
        operands[0].add_join(1);

        let expected_result = "\
t1
└─ t2 x
";
        assert_eq!(expected_result, explain_chain_to_string(&operands, 0).unwrap());
    }

    #[test]
    fn test_explain_committed_chain() {
        let mut operands = vec![
            ScanOperand::new("a"),
            ScanOperand::new("b"),
            ScanOperand::new("c"),
        ];
        operands[1].add_join(2);
        operands[2].add_join(0);
        operands[1].set_access(AccessChoice::FullScan);
        operands[2].set_access(AccessChoice::Index(IndexRef::new("c_join")));
        operands[0].set_access(AccessChoice::Index(IndexRef::new("a_join")));

        let expected_result = "\
b [full scan]
└─ c [index c_join]
   └─ a [index a_join]
";
        assert_eq!(expected_result, explain_chain_to_string(&operands, 1).unwrap());
    }
}

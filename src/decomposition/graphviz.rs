//! Visualize decompositions in the graphviz format.
use crate::decomposition::*;

/// Dumps a decomposition into graphviz format.
pub trait DumpInGraphviz {
    /// Dumps the rooted tree to a `std::io::Write` object in the graphviz
    /// format, one box per node showing its bag.
    fn dump_in_graphviz<W>(&self, out: &mut W, graph_name: &str) -> std::io::Result<()>
    where
        W: std::io::Write;
}

impl DumpInGraphviz for TreeDecomposition {
    fn dump_in_graphviz<W>(&self, out: &mut W, graph_name: &str) -> std::io::Result<()>
    where
        W: std::io::Write,
    {
        writeln!(out, "digraph {} {{", graph_name)?;
        for node in self.iter_nodes() {
            let bag: Vec<String> = self
                .bag(&node)
                .unwrap()
                .iter()
                .map(|v| v.to_raw().to_string())
                .collect();
            writeln!(
                out,
                "  {} [shape=box label=\"{{{}}}\"] ;",
                node.to_raw(),
                bag.join(",")
            )?;
        }
        for node in self.iter_nodes() {
            for child in self.children(&node).unwrap() {
                writeln!(out, "  {} -> {} ;", node.to_raw(), child.to_raw())?;
            }
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}

use std::env;
use std::path::Path;

use exec::ExecContext;
use itertools::Itertools;

mod exec;
mod repl;

fn main() -> std::io::Result<()> {
    let args = env::args().collect_vec();
    if args.len() == 1 {
        repl::repl();
        Ok(())
    } else {
        let path = Path::new(&args[1]);
        exec::exec_file(path, &mut ExecContext::default())
    }
}

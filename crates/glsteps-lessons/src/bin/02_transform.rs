use std::process::ExitCode;

fn main() -> ExitCode {
    glsteps_lessons::run(glsteps_lessons::catalog::transformed_triangle())
}

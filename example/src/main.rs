
mod templates {
    dry_htmlcompress::directory!("templates/");
    dry_htmlcompress::file!("template/button.html");
    //language=jinja2
    dry_htmlcompress::str!("hello_first_last", r#"
        <p>Hello {{ firstname }} {{ lastname }}</p>
    "#);
}


fn main() {
    println!("{}", templates::INDEX);
    println!("{}", templates::NAV);
    println!("{}", templates::BUTTON);
    println!("{}", templates::HELLO_FIRST_LAST);

    let compressor = dry_htmlcompress::Compressor::new(dry_htmlcompress::Options::SELECTIVE);
    match compressor.compress_file("template/button.html") {
        Ok(html) => println!("{}", html),
        Err(error) => eprintln!("{}", error),
    }
}
